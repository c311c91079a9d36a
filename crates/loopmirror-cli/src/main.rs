use loopmirror_lib::cli::{ResolvedCommand, parse_args, resolve_command};
use loopmirror_lib::error::LoopMirrorError;
use loopmirror_lib::run::{run_list, run_sync};
use loopmirror_lib::transfer::TracingReporter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), LoopMirrorError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    match command {
        ResolvedCommand::Sync(params) => {
            run_sync(&params, &mut TracingReporter::default()).await?;
        }
        ResolvedCommand::List(params) => {
            run_list(&params).await?;
        }
    }

    Ok(())
}
