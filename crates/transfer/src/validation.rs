use crate::TransferError;

/// Checks a part size before any transfer starts.
///
/// Any non-zero part size works with any threshold: a part larger than
/// the file just means the chunked path sends a single part.
pub fn validate_sizes(multipart_threshold: u64, part_size: u64) -> Result<(), TransferError> {
    if part_size == 0 {
        return Err(TransferError::InvalidPartSize(format!(
            "must be greater than zero (threshold {multipart_threshold})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lago_protocol::constants::{DEFAULT_MULTIPART_THRESHOLD, DEFAULT_PART_SIZE};

    #[test]
    fn defaults_are_valid() {
        assert!(validate_sizes(DEFAULT_MULTIPART_THRESHOLD, DEFAULT_PART_SIZE).is_ok());
    }

    #[test]
    fn rejects_zero_part_size() {
        assert!(matches!(
            validate_sizes(1024, 0),
            Err(TransferError::InvalidPartSize(_))
        ));
        assert!(matches!(
            validate_sizes(0, 0),
            Err(TransferError::InvalidPartSize(_))
        ));
    }

    #[test]
    fn accepts_zero_threshold() {
        assert!(validate_sizes(0, 1).is_ok());
    }

    #[test]
    fn accepts_part_larger_than_threshold() {
        assert!(validate_sizes(1024, 2048).is_ok());
        assert!(validate_sizes(1024, 1024).is_ok());
    }
}
