use std::{fs, path::Path};

use eyre::{eyre, Result};

use crate::{error::Error, utils::strings::decode_hex};

/// Write contents to a file on the disc, creating parent directories as needed
///
/// ```no_run
/// use bifrost_common::utils::io::file::write_file;
///
/// let result = write_file("/tmp/bifrost/test.txt", "Hello, World!");
/// ```
pub fn write_file(path_str: &str, contents: &str) -> Result<()> {
    let path = Path::new(path_str);

    // create the directory if it doesn't exist
    fs::create_dir_all(path.parent().ok_or_else(|| eyre!("unable to create directory"))?)?;
    fs::write(path, contents)?;

    Ok(())
}

/// Read contents from a file on the disc
///
/// ```no_run
/// use bifrost_common::utils::io::file::read_file;
///
/// let contents = read_file("/tmp/bifrost/test.txt");
/// ```
pub fn read_file(path: &str) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Delete a file or directory from the disc. Returns true if nothing is left at `path`.
pub fn delete_path(path: &str) -> bool {
    let path = Path::new(path);
    let removed = if path.is_dir() { fs::remove_dir_all(path) } else { fs::remove_file(path) };
    removed.is_ok() || !path.exists()
}

/// Reads bytecode given either as a hex string or as the path of a file containing one.
///
/// ```
/// use bifrost_common::utils::io::file::read_code;
///
/// assert_eq!(read_code("0x602a").expect("valid hex"), vec![0x60, 0x2a]);
/// ```
pub fn read_code(target: &str) -> Result<Vec<u8>, Error> {
    let contents = if Path::new(target).is_file() {
        fs::read_to_string(target)?
    } else {
        target.to_owned()
    };

    decode_hex(&contents).map_err(|e| Error::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir().join("bifrost-common-tests").join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_write_then_read_file() {
        let path = temp_path("roundtrip.txt");
        write_file(&path, "Hello, World!").expect("unable to write file");
        assert_eq!(read_file(&path).expect("unable to read file"), "Hello, World!");
        assert!(delete_path(&path));
    }

    #[test]
    fn test_read_file_failure() {
        assert!(read_file("/nonexistent/bifrost/test.txt").is_err());
    }

    #[test]
    fn test_delete_missing_path() {
        assert!(delete_path("/nonexistent/bifrost/test_dir"));
    }

    #[test]
    fn test_read_code_from_file() {
        let path = temp_path("code.hex");
        write_file(&path, "0x6001600201\n").expect("unable to write file");
        assert_eq!(read_code(&path).expect("valid code"), vec![0x60, 0x01, 0x60, 0x02, 0x01]);
        delete_path(&path);
    }

    #[test]
    fn test_read_code_rejects_garbage() {
        assert!(matches!(read_code("not hex"), Err(Error::InvalidHex(_))));
    }
}
