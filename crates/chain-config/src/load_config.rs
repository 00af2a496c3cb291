/*
 * Nox Fluence Peer
 *
 * Copyright (C) 2024 Fluence DAO
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation version 3 of the
 * License.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat, FileSourceFile};

use crate::args::ConfigArgs;
use crate::chain_config::ChainConfig;
use crate::defaults::{CONFIG_ENV, CONFIG_FILE, ENV_PREFIX};

/// Hierarchically loads the configuration using files, envs and args.
/// The source order is:
///  - Load and parse Config.toml from cwd, if exists
///  - Load and parse files provided by RENCTL_CONFIG env var
///  - Load and parse files provided by --config arg
///  - Load config values from RENCTL_* env vars, nested keys are separated by "__"
///  - Load config values from args
/// On each stage the values override the previous ones.
pub fn load_config(args: &ConfigArgs) -> eyre::Result<ChainConfig> {
    let env_config_sources: Vec<File<FileSourceFile, FileFormat>> = std::env::var_os(CONFIG_ENV)
        .map(|str| {
            str.to_string_lossy()
                .trim()
                .split(',')
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
                .map(|path| File::from(path).format(FileFormat::Toml))
                .collect()
        })
        .unwrap_or_default();

    let mut config_builder = Config::builder().add_source(
        File::with_name(CONFIG_FILE)
            .required(false)
            .format(FileFormat::Toml),
    );

    for source in env_config_sources {
        config_builder = config_builder.add_source(source)
    }

    for path in &args.config {
        config_builder =
            config_builder.add_source(File::from(path.clone()).format(FileFormat::Toml))
    }

    let env_source = Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .prefix_separator("_")
        .separator("__");
    config_builder = config_builder.add_source(env_source);

    for (key, value) in args.overrides() {
        config_builder = config_builder.set_override(key, value)?;
    }

    let config: ChainConfig = config_builder.build()?.try_deserialize()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::str::FromStr;
    use std::time::Duration;

    use alloy_primitives::Address;
    use tempfile::NamedTempFile;

    use super::*;

    const WALLET_KEY: &str = "0x97a2456e78c4894c62eef6031972d1ca296ed40bf311ab54c231f13db59fc428";

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Could not create temp file");
        write!(file, "{}", content).expect("Could not write in file");
        file
    }

    #[test]
    fn load_empty_config() {
        temp_env::with_var_unset(CONFIG_ENV, || {
            let config = load_config(&ConfigArgs::default()).expect("Could not load config");
            assert_eq!(config.http_endpoint, "http://127.0.0.1:8545");
            assert_eq!(config.network_id, 1);
            assert!(config.wallet_key.is_none());
            assert_eq!(config.receipt_timeout, Duration::from_secs(120));
        });
    }

    #[test]
    fn load_config_from_env_file() {
        let file = config_file(&format!(
            r#"
            http_endpoint = "http://localhost:7545"
            ws_endpoint = "ws://localhost:7546"
            network_id = 42
            wallet_key = "{WALLET_KEY}"
            receipt_timeout = "30s"

            [contracts]
            republic_token = "0x408e41876cccdc0f92210600ef50372656052a38"
            darknode_registry = "0x8dc7d48492b9fD2519b65A54816be03758742c60"
            "#
        ));

        let path = file.path().display().to_string();
        temp_env::with_var(CONFIG_ENV, Some(path), || {
            let config = load_config(&ConfigArgs::default()).expect("Could not load config");
            assert_eq!(config.http_endpoint, "http://localhost:7545");
            assert_eq!(config.ws_endpoint.as_deref(), Some("ws://localhost:7546"));
            assert_eq!(config.network_id, 42);
            assert_eq!(config.receipt_timeout, Duration::from_secs(30));
            assert!(config.wallet_address().is_some());
            assert_eq!(
                config.contracts.republic_token,
                Some(Address::from_str("0x408e41876cccdc0f92210600ef50372656052a38").unwrap())
            );
            assert!(config.contracts.orderbook.is_none());
        });
    }

    #[test]
    fn args_override_files_and_env() {
        let file = config_file(
            r#"
            http_endpoint = "http://localhost:7545"
            network_id = 42
            "#,
        );

        let args = ConfigArgs {
            config: vec![file.path().to_path_buf()],
            http_endpoint: Some("http://override:8545".to_string()),
            network_id: None,
            ..Default::default()
        };

        temp_env::with_vars(
            [
                (CONFIG_ENV, None),
                ("RENCTL_NETWORK_ID", Some("5")),
                ("RENCTL_CONTRACTS__ORDERBOOK", Some("0x68B1D87F95878fE05B998F19b66F4baba5De1aed")),
            ],
            || {
                let config = load_config(&args).expect("Could not load config");
                assert_eq!(config.http_endpoint, "http://override:8545");
                assert_eq!(config.network_id, 5);
                assert_eq!(
                    config.contracts.orderbook,
                    Some(Address::from_str("0x68B1D87F95878fE05B998F19b66F4baba5De1aed").unwrap())
                );
            },
        );
    }

    #[test]
    fn env_vars_override_files() {
        let file = config_file(
            r#"
            network_id = 42
            receipt_timeout = "30s"
            "#,
        );
        let path = file.path().display().to_string();

        temp_env::with_vars(
            [
                (CONFIG_ENV, Some(path.as_str())),
                ("RENCTL_NETWORK_ID", Some("7")),
                ("RENCTL_RECEIPT_TIMEOUT", Some("10s")),
                ("RENCTL_WS_ENDPOINT", Some("ws://env:8546")),
                ("RENCTL__NETWORK_ID", None),
            ],
            || {
                let config = load_config(&ConfigArgs::default()).expect("Could not load config");
                assert_eq!(config.network_id, 7);
                assert_eq!(config.receipt_timeout, Duration::from_secs(10));
                assert_eq!(config.ws_endpoint.as_deref(), Some("ws://env:8546"));
            },
        );
    }

    #[test]
    fn invalid_wallet_key_is_error() {
        let file = config_file(r#"wallet_key = "not a key""#);
        let path = file.path().display().to_string();
        temp_env::with_var(CONFIG_ENV, Some(path), || {
            assert!(load_config(&ConfigArgs::default()).is_err());
        });
    }
}
