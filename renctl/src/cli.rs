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
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use chain_config::ConfigArgs;
use chain_types::{DarknodeId, OrderId};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Registry parameters, epochs and the list of registered darknodes
    Registry {
        #[arg(long, default_value_t = chain_connector::DEFAULT_PAGE_SIZE)]
        page_size: u64,
    },
    /// Registration status, bond and owner of a darknode
    Darknode { id: DarknodeId },
    /// Everything the orderbook stores about an order
    Order { id: OrderId },
    /// Page of orders in the order they were opened
    Orders {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },
    /// REN balance of an address
    Balance {
        #[arg(value_parser = parse_address)]
        address: Address,
    },
    /// Transfer REN from the configured wallet
    Transfer {
        #[arg(value_parser = parse_address)]
        to: Address,
        /// Amount in the smallest token unit
        #[arg(value_parser = parse_u256)]
        amount: U256,
    },
    /// Call epoch() on the registry if the minimum interval has passed
    Epoch,
    /// Print contract events until interrupted
    Watch {
        #[arg(value_enum)]
        target: WatchTarget,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    Registry,
    Token,
    Orderbook,
}

fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|e| format!("invalid address {s}: {e}"))
}

fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str(s).map_err(|e| format!("invalid amount {s}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn parse_transfer() {
        let cli = Cli::try_parse_from([
            "renctl",
            "--http-endpoint",
            "http://localhost:8545",
            "transfer",
            "0x00000000000000000000000000000000000000f2",
            "1000000000000000000",
        ])
        .unwrap();

        assert_eq!(
            cli.config.http_endpoint.as_deref(),
            Some("http://localhost:8545")
        );
        assert_eq!(
            cli.command,
            Command::Transfer {
                to: address!("00000000000000000000000000000000000000f2"),
                amount: U256::from(10u64).pow(U256::from(18)),
            }
        );
    }

    #[test]
    fn parse_orders_defaults() {
        let cli = Cli::try_parse_from(["renctl", "orders", "--limit", "5"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Orders {
                offset: 0,
                limit: 5
            }
        );
    }

    #[test]
    fn parse_watch_target() {
        let cli = Cli::try_parse_from(["renctl", "watch", "token"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Watch {
                target: WatchTarget::Token
            }
        );
        assert!(Cli::try_parse_from(["renctl", "watch", "settlement"]).is_err());
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(Cli::try_parse_from(["renctl", "darknode", "0x1234"]).is_err());
        assert!(Cli::try_parse_from(["renctl", "order", "not-an-order"]).is_err());
        assert!(Cli::try_parse_from(["renctl", "balance", "0xzz"]).is_err());
    }

    #[test]
    fn parse_darknode() {
        let cli = Cli::try_parse_from([
            "renctl",
            "-c",
            "a.toml,b.toml",
            "darknode",
            "0x67b2ad3866429282e16e55b715d12a77f85b7ce8",
        ])
        .unwrap();

        assert_eq!(cli.config.config.len(), 2);
        assert!(matches!(cli.command, Command::Darknode { .. }));
    }
}
