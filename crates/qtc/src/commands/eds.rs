//! Eds command - data store objects and files.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use qtc_client::{Collection, Eds, QueryOptions};
use serde_json::{Value, json};

use super::{Context, note, parse_json, parse_json_opt, print_json};

/// Arguments for the eds command.
#[derive(Args, Debug)]
pub struct EdsArgs {
    #[command(subcommand)]
    pub command: EdsCommand,
}

#[derive(Subcommand, Debug)]
pub enum EdsCommand {
    /// Find objects in a collection
    Find {
        /// Collection name (`users` and `usergroups` are built in)
        collection: String,

        /// Filter as JSON, e.g. '{"age": {"$gt": 20}}'
        #[arg(short, long)]
        filter: Option<String>,

        /// Maximum objects to return
        #[arg(short, long)]
        limit: Option<u64>,

        /// Objects to skip
        #[arg(long)]
        offset: Option<u64>,

        /// Sort as JSON, e.g. '[{"sortBy": "name"}]'
        #[arg(long)]
        sort: Option<String>,

        /// Related objects to include, as JSON
        #[arg(long)]
        include: Option<String>,
    },

    /// Count objects in a collection
    Count {
        collection: String,

        /// Filter as JSON
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show one object
    Get {
        collection: String,
        id: String,

        /// Related objects to include, as JSON
        #[arg(long)]
        include: Option<String>,
    },

    /// Insert an object given as JSON
    Insert { collection: String, object: String },

    /// Update an object with fields given as JSON
    Update {
        collection: String,
        id: String,
        object: String,
    },

    /// Remove an object
    Remove { collection: String, id: String },

    /// Attach a local file to an object property
    Attach {
        collection: String,
        id: String,
        /// Property receiving the file
        field: String,
        file: PathBuf,
    },

    /// Download a file; a destination ending in `/` is a directory
    Download {
        file_id: String,
        destination: PathBuf,

        /// Image variant, e.g. `thumbnail`
        #[arg(long)]
        variant: Option<String>,
    },
}

fn collection(eds: &Eds, name: &str) -> Collection {
    match name {
        "users" => eds.users(),
        "usergroups" => eds.usergroups(),
        other => eds.collection(other),
    }
}

/// Run the eds command.
pub async fn run(args: EdsArgs, ctx: &Context) -> Result<()> {
    let eds = Eds::new(ctx.config.eds()?)?;
    let opts = ctx.call_options();

    match args.command {
        EdsCommand::Find {
            collection: name,
            filter,
            limit,
            offset,
            sort,
            include,
        } => {
            let query = QueryOptions {
                filter: parse_json_opt(filter.as_deref(), "filter")?,
                limit,
                offset,
                sort: parse_json_opt(sort.as_deref(), "sort")?,
                include: parse_json_opt(include.as_deref(), "include")?,
                count_only: false,
            };
            let objects = collection(&eds, &name).find(&query, opts).await?;
            note(ctx, &format!("{} object(s)", objects.len()));
            print_json(&Value::Array(objects))
        }
        EdsCommand::Count {
            collection: name,
            filter,
        } => {
            let filter = parse_json_opt(filter.as_deref(), "filter")?;
            let count = collection(&eds, &name).count(filter, opts).await?;
            print_json(&json!({ "count": count }))
        }
        EdsCommand::Get {
            collection: name,
            id,
            include,
        } => {
            let include = parse_json_opt(include.as_deref(), "include")?;
            let object = collection(&eds, &name)
                .find_one(&id, include.as_ref(), opts)
                .await?;
            print_json(&object)
        }
        EdsCommand::Insert {
            collection: name,
            object,
        } => {
            let object = parse_json(&object, "object")?;
            print_json(&collection(&eds, &name).insert(&object, opts).await?)
        }
        EdsCommand::Update {
            collection: name,
            id,
            object,
        } => {
            let object = parse_json(&object, "object")?;
            print_json(&collection(&eds, &name).update(&id, &object, opts).await?)
        }
        EdsCommand::Remove {
            collection: name,
            id,
        } => {
            collection(&eds, &name).remove(&id, opts).await?;
            print_json(&json!({ "removed": id }))
        }
        EdsCommand::Attach {
            collection: name,
            id,
            field,
            file,
        } => {
            note(ctx, &format!("Uploading {}", file.display()));
            let created = collection(&eds, &name)
                .attach_file(&id, &field, &file, opts)
                .await?;
            print_json(&created)
        }
        EdsCommand::Download {
            file_id,
            destination,
            variant,
        } => {
            let downloaded = eds
                .download_file(&file_id, &destination, variant.as_deref(), opts)
                .await?;
            print_json(&json!({
                "path": downloaded.path.display().to_string(),
                "bytes": downloaded.bytes,
            }))
        }
    }
}
