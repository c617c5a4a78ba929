use bifrost_common::utils::io::file::write_file;
use tracing::info;

use crate::error::Error;

/// Writes `contents` to `output`, or prints them when `output` is `print`.
pub(crate) fn write_or_print(output: &str, contents: &str) -> Result<(), Error> {
    if output == "print" {
        println!("{contents}");
        return Ok(());
    }

    write_file(output, contents)
        .map_err(|e| Error::Generic(format!("failed to write '{output}': {e}")))?;
    info!("wrote output to '{}'", output);
    Ok(())
}
