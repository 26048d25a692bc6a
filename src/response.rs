//! Response command: tabulate a response function.

use anyhow::{Context, Result};
use tracing::info;

use aquifer_rfunc::KernelOptions;

use crate::cli::ResponseArgs;

/// Prints the duration and the step/block response table of one response
/// function.
pub fn run(args: ResponseArgs) -> Result<()> {
    let rfunc = args.kind;
    rfunc
        .check_parameters(&args.params)
        .with_context(|| format!("invalid parameters for {rfunc} ({:?})", rfunc.param_names()))?;

    let duration = rfunc
        .duration(&args.params, args.cutoff)
        .context("failed to compute response duration")?;
    let options = KernelOptions::new(args.dt).with_cutoff(args.cutoff);
    let kernel = rfunc
        .kernel(&args.params, &options)
        .context("failed to build response kernel")?;
    info!(%rfunc, duration, len = kernel.len(), truncated = kernel.truncated(), "kernel built");

    println!("# {rfunc}: gain {}, duration {duration:.3} days", rfunc.gain(&args.params));
    println!("t\tstep\tblock");
    for (k, (step, block)) in kernel.step().iter().zip(kernel.block()).enumerate() {
        let t = args.dt * (k + 1) as f64;
        println!("{t}\t{step:.6e}\t{block:.6e}");
    }
    Ok(())
}
