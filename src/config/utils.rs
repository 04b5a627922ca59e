use std::env;

/// Read an environment variable as u16, returning None when unset
pub(super) fn parse_env_u16(name: &str) -> Result<Option<u16>, Box<dyn std::error::Error>> {
    match env::var(name) {
        Ok(value) => {
            let parsed = value
                .parse::<u16>()
                .map_err(|e| format!("Invalid value '{value}' for {name}: {e}"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

/// Read an environment variable as u64, returning None when unset
pub(super) fn parse_env_u64(name: &str) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    match env::var(name) {
        Ok(value) => {
            let parsed = value
                .parse::<u64>()
                .map_err(|e| format!("Invalid value '{value}' for {name}: {e}"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}
