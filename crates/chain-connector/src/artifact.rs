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

use std::path::{Path, PathBuf};

use alloy_primitives::Bytes;
use serde_json::Value;
use thiserror::Error;

use hex_utils::{decode_hex, FromHexError};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path:?}: {err}")]
    Read {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("invalid artifact json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("artifact of {0} has no bytecode, abstract contracts and interfaces can't be deployed")]
    NoBytecode(String),
    #[error("bytecode of {contract} references unlinked library {library}")]
    UnlinkedLibrary { contract: String, library: String },
    #[error("bytecode of {0} is not a valid hex: {1}")]
    DecodeHex(String, #[source] FromHexError),
}

/// Compiled contract as emitted by truffle or solc, only the parts needed for deployment
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: Value,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| ArtifactError::Read {
            path: path.to_path_buf(),
            err,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: Value = serde_json::from_str(json)?;
        let contract_name = artifact
            .get("contractName")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        let abi = artifact.get("abi").cloned().unwrap_or(Value::Array(vec![]));

        // truffle keeps a plain string, foundry and hardhat wrap it into {"object": ..}
        let bytecode = match artifact.get("bytecode") {
            Some(Value::String(code)) => code.as_str(),
            Some(Value::Object(code)) => code.get("object").and_then(Value::as_str).unwrap_or(""),
            _ => "",
        };

        let code = bytecode.trim_start_matches("0x");
        if code.is_empty() {
            return Err(ArtifactError::NoBytecode(contract_name));
        }
        if let Some(library) = unlinked_library(code) {
            return Err(ArtifactError::UnlinkedLibrary {
                contract: contract_name,
                library,
            });
        }

        let bytecode = decode_hex(code)
            .map_err(|err| ArtifactError::DecodeHex(contract_name.clone(), err))?
            .into();

        Ok(Self {
            contract_name,
            abi,
            bytecode,
        })
    }

    /// Creation code followed by abi-encoded constructor arguments
    pub fn deploy_data(&self, constructor_args: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.bytecode.len() + constructor_args.len());
        data.extend_from_slice(&self.bytecode);
        data.extend_from_slice(constructor_args);
        data
    }
}

/// Library placeholders look like `__LibraryName____` in not yet linked bytecode
fn unlinked_library(code: &str) -> Option<String> {
    let start = code.find("__")?;
    let name = code[start..]
        .trim_start_matches('_')
        .split('_')
        .next()
        .unwrap_or_default();
    Some(name.to_string())
}
