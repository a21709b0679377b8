use std::path::Path;

use crate::{
    constants::{
        OKX_UIDS_FILE_PATH, OKX_WALLETS_FILE_PATH, PRIVATE_KEYS_FILE_PATH, PROXIES_FILE_PATH,
    },
    errors::InputError,
};

/// One account of the faucet workflow, correlated by line number across input files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaucetEntry {
    pub private_key: String,
    pub proxy: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimsEntry {
    pub private_key: String,
    pub proxy: String,
    pub okx_wallet: String,
    pub okx_uid: String,
}

#[derive(Clone, Debug, Default)]
pub struct FaucetInputs {
    pub private_keys: Vec<String>,
    pub proxies: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ClaimsInputs {
    pub private_keys: Vec<String>,
    pub proxies: Vec<String>,
    pub okx_wallets: Vec<String>,
    pub okx_uids: Vec<String>,
}

pub fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

pub async fn read_file_lines(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| eyre::eyre!("Failed to read {}: {e}", path.display()))?;

    Ok(parse_lines(&contents))
}

fn ensure_equal_lengths(lists: &[(&str, usize)]) -> Result<(), InputError> {
    let Some((_, expected)) = lists.first() else {
        return Ok(());
    };

    if lists.iter().all(|(_, len)| len == expected) {
        return Ok(());
    }

    let summary = lists
        .iter()
        .map(|(name, len)| format!("{name}={len}"))
        .collect::<Vec<_>>()
        .join(", ");

    Err(InputError::LengthMismatch(summary))
}

impl FaucetInputs {
    pub async fn read_default() -> eyre::Result<Self> {
        Ok(Self {
            private_keys: read_file_lines(PRIVATE_KEYS_FILE_PATH).await?,
            proxies: read_file_lines(PROXIES_FILE_PATH).await?,
        })
    }

    pub fn into_entries(self) -> Result<Vec<FaucetEntry>, InputError> {
        ensure_equal_lengths(&[
            ("private_keys", self.private_keys.len()),
            ("proxies", self.proxies.len()),
        ])?;

        Ok(self
            .private_keys
            .into_iter()
            .zip(self.proxies)
            .map(|(private_key, proxy)| FaucetEntry { private_key, proxy })
            .collect())
    }
}

impl ClaimsInputs {
    pub async fn read_default() -> eyre::Result<Self> {
        Ok(Self {
            private_keys: read_file_lines(PRIVATE_KEYS_FILE_PATH).await?,
            proxies: read_file_lines(PROXIES_FILE_PATH).await?,
            okx_wallets: read_file_lines(OKX_WALLETS_FILE_PATH).await?,
            okx_uids: read_file_lines(OKX_UIDS_FILE_PATH).await?,
        })
    }

    pub fn into_entries(self) -> Result<Vec<ClaimsEntry>, InputError> {
        tracing::info!(
            "Loaded {} proxies, {} private keys, {} OKX wallets, {} OKX UIDs",
            self.proxies.len(),
            self.private_keys.len(),
            self.okx_wallets.len(),
            self.okx_uids.len()
        );

        ensure_equal_lengths(&[
            ("proxies", self.proxies.len()),
            ("private_keys", self.private_keys.len()),
            ("okx_wallets", self.okx_wallets.len()),
            ("okx_uids", self.okx_uids.len()),
        ])?;

        let entries = self
            .private_keys
            .into_iter()
            .zip(self.proxies)
            .zip(self.okx_wallets.into_iter().zip(self.okx_uids))
            .map(|((private_key, proxy), (okx_wallet, okx_uid))| ClaimsEntry {
                private_key,
                proxy,
                okx_wallet,
                okx_uid,
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_lines_strips_carriage_returns_and_blanks() {
        let lines = parse_lines("0xabc\r\n\r\n  def  \nghi\n\n");
        assert_eq!(lines, strings(&["0xabc", "def", "ghi"]));
    }

    #[test]
    fn faucet_entries_are_zipped_by_position() {
        let inputs = FaucetInputs {
            private_keys: strings(&["k1", "k2"]),
            proxies: strings(&["p1", "p2"]),
        };

        let entries = inputs.into_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].private_key, "k2");
        assert_eq!(entries[1].proxy, "p2");
    }

    #[test]
    fn faucet_length_mismatch_is_rejected() {
        let inputs = FaucetInputs {
            private_keys: strings(&["k1", "k2"]),
            proxies: strings(&["p1", "p2", "p3"]),
        };

        let err = inputs.into_entries().unwrap_err();
        assert_eq!(
            err,
            InputError::LengthMismatch("private_keys=2, proxies=3".to_string())
        );
    }

    #[test]
    fn claims_entries_keep_metadata_aligned() {
        let inputs = ClaimsInputs {
            private_keys: strings(&["k1", "k2"]),
            proxies: strings(&["p1", "p2"]),
            okx_wallets: strings(&["w1", "w2"]),
            okx_uids: strings(&["u1", "u2"]),
        };

        let entries = inputs.into_entries().unwrap();
        assert_eq!(
            entries[0],
            ClaimsEntry {
                private_key: "k1".into(),
                proxy: "p1".into(),
                okx_wallet: "w1".into(),
                okx_uid: "u1".into(),
            }
        );
        assert_eq!(entries[1].okx_uid, "u2");
    }

    #[test]
    fn claims_length_mismatch_in_any_list_is_rejected() {
        let inputs = ClaimsInputs {
            private_keys: strings(&["k1", "k2"]),
            proxies: strings(&["p1", "p2"]),
            okx_wallets: strings(&["w1", "w2"]),
            okx_uids: strings(&["u1"]),
        };

        assert!(matches!(
            inputs.into_entries(),
            Err(InputError::LengthMismatch(_))
        ));
    }
}
