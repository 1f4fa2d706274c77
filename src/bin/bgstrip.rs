//! bgstrip command line tool
//!
//! Removes image backgrounds with an ONNX segmentation model, then converts
//! or recolors the result.

use bgstrip::cli;

fn main() -> anyhow::Result<std::process::ExitCode> {
    cli::main()
}
