//! Volumes command - show the volume set a repair would search

use crate::cli::args::{OutputFormat, VolumesArgs};
use crate::config::Config;
use crate::error::RelinkResult;
use crate::volumes::{self, VolumeSelection};
use console::style;

pub async fn execute(args: VolumesArgs, config: &Config) -> RelinkResult<()> {
    let selection = volumes::plan(&config.volumes, &[], &args.exclude);

    match args.format {
        OutputFormat::Table => print_table(&selection),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&selection)?),
        OutputFormat::Plain => {
            for volume in &selection.searched {
                println!("{}", volume);
            }
        }
    }
    Ok(())
}

fn print_table(selection: &VolumeSelection) {
    println!("{:<50} {:<10}", "VOLUME", "STATUS");
    println!("{}", "-".repeat(60));

    for volume in &selection.searched {
        println!("{:<50} {}", volume.to_string(), style("search").green());
    }
    for volume in &selection.excluded {
        println!("{:<50} {}", volume.to_string(), style("excluded").dim());
    }

    println!();
    println!(
        "Total: {} searched, {} excluded ({})",
        selection.searched.len(),
        selection.excluded.len(),
        selection.source
    );
}
