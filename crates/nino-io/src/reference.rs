//! Ensure the land-fraction reference is available locally.
//!
//! The reference is fetched once from [`MaskSource::url`] and kept at
//! [`MaskSource::path`]. Downloads stream into a temporary file next to the
//! destination and are renamed into place, so the destination either does not
//! exist or holds a complete file.
//!
//! Two processes that start with the file missing will both download it. The
//! rename keeps the result whole, but the work is done twice.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use nino_core::{NinoError, NinoResult};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::MaskSource;

/// Return the local path of the reference, downloading it first if needed.
///
/// An existing file is returned untouched, whatever its contents.
pub fn ensure_reference(source: &MaskSource) -> NinoResult<PathBuf> {
    let dest = source.path.clone();
    if dest.is_file() {
        debug!(path = %dest.display(), "land-fraction reference already present");
        return Ok(dest);
    }

    info!(url = %source.url, path = %dest.display(), "downloading land-fraction reference");
    download_to_path(&source.url, &dest)?;
    info!(path = %dest.display(), "land-fraction reference ready");
    Ok(dest)
}

#[cfg(feature = "native-io")]
fn download_to_path(url: &str, dest: &Path) -> NinoResult<()> {
    let response = match ureq::get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => {
            return Err(NinoError::Fetch(format!(
                "failed to download {url}: HTTP {code}"
            )));
        }
        Err(err) => {
            return Err(NinoError::Fetch(format!("requesting {url}: {err}")));
        }
    };
    write_atomically(response.into_reader(), dest)
}

#[cfg(not(feature = "native-io"))]
fn download_to_path(_url: &str, _dest: &Path) -> NinoResult<()> {
    Err(NinoError::FeatureDisabled(
        "downloading the land-fraction reference",
        "native-io",
    ))
}

/// Copy `reader` into `dest` through a temporary file in the same directory.
///
/// Parent directories are created as needed. On any error the temporary file
/// is removed and `dest` is left as it was.
pub fn write_atomically(mut reader: impl Read, dest: &Path) -> NinoResult<()> {
    let mut staged = staging_file(dest)?;
    io::copy(&mut reader, staged.as_file_mut())
        .with_context(|| format!("writing {}", dest.display()))?;
    persist(staged, dest)
}

/// Temporary file beside `dest`, so the final rename stays on one filesystem.
pub(crate) fn staging_file(dest: &Path) -> NinoResult<NamedTempFile> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    Ok(NamedTempFile::new_in(dir)?)
}

pub(crate) fn persist(staged: NamedTempFile, dest: &Path) -> NinoResult<()> {
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|err| NinoError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_at(path: PathBuf, url: &str) -> MaskSource {
        MaskSource {
            url: url.to_string(),
            path,
            ..MaskSource::default()
        }
    }

    #[test]
    fn existing_reference_is_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.csv");
        std::fs::write(&path, "lat,lon,sftlf\n0,180,0\n").unwrap();

        // an unroutable URL proves no request is made
        let source = source_at(path.clone(), "http://127.0.0.1:9/mask.csv");
        assert_eq!(ensure_reference(&source).unwrap(), path);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "lat,lon,sftlf\n0,180,0\n"
        );
    }

    #[test]
    fn unreachable_url_fails_without_leaving_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.nc");
        let source = source_at(path.clone(), "http://127.0.0.1:9/mask.nc");

        let err = ensure_reference(&source).unwrap_err();
        if cfg!(feature = "native-io") {
            assert!(matches!(err, NinoError::Fetch(_)));
        } else {
            assert!(matches!(err, NinoError::FeatureDisabled(..)));
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Serve a single HTTP response on a loopback port and return its URL.
    #[cfg(feature = "native-io")]
    fn serve_once(response: &'static [u8]) -> String {
        use std::io::Write;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            stream.write_all(response).unwrap();
        });
        format!("http://{addr}/mask.nc")
    }

    #[cfg(feature = "native-io")]
    #[test]
    fn http_error_status_is_reported_with_its_code() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.nc");

        let err = ensure_reference(&source_at(path.clone(), &url)).unwrap_err();
        assert!(matches!(err, NinoError::Fetch(_)));
        assert!(err.to_string().contains("HTTP 404"));
        assert!(!path.exists());
    }

    #[cfg(feature = "native-io")]
    #[test]
    fn successful_download_lands_at_the_destination() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nsftlf",
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("mask.nc");

        assert_eq!(ensure_reference(&source_at(path.clone(), &url)).unwrap(), path);
        assert_eq!(std::fs::read(&path).unwrap(), b"sftlf");
    }

    #[test]
    fn atomic_write_creates_parents_and_leaves_no_temporaries() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("mask.nc");
        write_atomically(&b"netcdf bytes"[..], &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"netcdf bytes");
        let entries: Vec<_> = std::fs::read_dir(dest.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("mask.nc")]);
    }

    #[test]
    fn atomic_write_replaces_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mask.nc");
        std::fs::write(&dest, "old").unwrap();
        write_atomically(&b"new"[..], &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn failed_read_keeps_the_destination() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mask.nc");
        std::fs::write(&dest, "complete").unwrap();
        assert!(write_atomically(Broken, &dest).is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "complete");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
