//! PEM artifact loading.
//!
//! Artifacts arrive from the builder already PEM-encoded and are
//! written through the staging primitives; this module covers the read
//! side, yielding DER bodies for the parsers.

use std::path::Path;

use crate::StoreError;

/// Decode the first PEM block from raw bytes.
pub fn read_pem_block(path: &Path, data: &[u8]) -> Result<pem::Pem, StoreError> {
    pem::parse(data).map_err(|_| StoreError::PemDecode {
        path: path.to_path_buf(),
    })
}

/// Read a file and decode its first PEM block, returning the DER body.
pub fn load_pem(path: &Path) -> Result<Vec<u8>, StoreError> {
    let data = std::fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(read_pem_block(path, &data)?.into_contents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("carp-pemfile-{name}-{nanos}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_returns_der_body() {
        let dir = temp_dir("load");
        let path = dir.join("ca.crt");
        let der = vec![0x30u8, 0x03, 0x02, 0x01, 0x01];

        let block = pem::Pem::new("CERTIFICATE", der.clone());
        std::fs::write(&path, pem::encode(&block)).unwrap();

        assert_eq!(load_pem(&path).unwrap(), der);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_rejects_non_pem_content() {
        let dir = temp_dir("garbage");
        let path = dir.join("ca.crt");
        std::fs::write(&path, "not pem at all").unwrap();

        let err = load_pem(&path).unwrap_err();
        assert!(matches!(err, StoreError::PemDecode { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("carp-pemfile-missing.pem");
        let err = load_pem(&path).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }
}
