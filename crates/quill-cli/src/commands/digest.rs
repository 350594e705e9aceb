use chrono::Utc;
use quill_core::digest::{generate_digest, LocalSummarizer};
use quill_core::storage::DigestRange;
use quill_core::DigestStore;

use crate::app::AppContext;
use crate::cli::DigestArgs;
use crate::output::print_digest;

pub fn handle_digest(ctx: &AppContext<'_>, args: &DigestArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let owner = ctx.owner()?;

    if args.list {
        let digests = service.store().list_digests(&owner)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&digests)?);
        } else if digests.is_empty() {
            if !ctx.quiet() {
                println!("No digests yet.");
            }
        } else {
            for (index, digest) in digests.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                print_digest(digest, ctx.quiet());
            }
        }
        return Ok(());
    }

    let range: DigestRange = args.range.parse()?;
    let digest = generate_digest(
        service.store(),
        &LocalSummarizer::new(),
        &owner,
        range,
        Utc::now(),
    )?;

    match digest {
        Some(digest) if args.json => println!("{}", serde_json::to_string_pretty(&digest)?),
        Some(digest) => print_digest(&digest, ctx.quiet()),
        None if args.json => println!("null"),
        None => {
            if !ctx.quiet() {
                println!("No non-sensitive notes in this {} period.", range);
            }
        }
    }
    Ok(())
}
