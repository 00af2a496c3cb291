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

use tracing_subscriber::filter::Directive;

fn default_directives() -> Vec<Directive> {
    let namespaces = vec![
        "chain-connector=debug",
        "chain-listener=debug",
        "chain-data=info",
        "renctl=debug",
        "jsonrpsee=info",
        "jsonrpsee_core=info",
        "jsonrpsee_client_transport=info",
        "hyper=info",
        "hyper_util=info",
        "soketto=info",
        "tokio=info",
        "mio=info",
        "polling=info",
    ];

    namespaces
        .into_iter()
        .filter_map(|ns| match ns.trim().parse() {
            Ok(directive) => Some(directive),
            Err(e) => {
                eprintln!("cannot parse {ns} to Directive: {e}");
                None
            }
        })
        .collect()
}

// Enables logging, filtering out unnecessary details
pub fn enable_logs() {
    enable_logs_for(LogSpec::default())
}

pub struct LogSpec {
    level: tracing::metadata::Level,
    directives: Vec<Directive>,
}

impl Default for LogSpec {
    fn default() -> Self {
        Self::new(vec![])
            .with_defaults()
            .with_level(tracing::metadata::Level::INFO)
    }
}

impl LogSpec {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self {
            level: tracing::metadata::Level::INFO,
            directives,
        }
    }

    pub fn with_level(mut self, level: tracing::metadata::Level) -> Self {
        self.level = level;

        self
    }

    pub fn with_defaults(mut self) -> Self {
        self.directives = default_directives()
            .into_iter()
            .chain(self.directives)
            .collect();

        self
    }

    pub fn with_directives(mut self, directives: Vec<Directive>) -> Self {
        self.directives = self.directives.into_iter().chain(directives).collect();

        self
    }

    fn env_filter(self) -> tracing_subscriber::EnvFilter {
        let env = std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).ok();
        self.env_filter_with(env.as_deref())
    }

    /// `env` directives are added after the spec ones, so they win for the same target
    fn env_filter_with(self, env: Option<&str>) -> tracing_subscriber::EnvFilter {
        let mut filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(self.level.into())
            .parse_lossy("");

        for d in self.directives {
            filter = filter.add_directive(d);
        }

        let env_directives = env
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|ns| !ns.is_empty());
        for ns in env_directives {
            match ns.parse::<Directive>() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("ignoring {ns} from RUST_LOG: {e}"),
            }
        }

        filter
    }
}

/// Installs a global fmt subscriber, `RUST_LOG` directives are applied on top of `spec`.
/// Does nothing if a subscriber is already installed.
pub fn enable_logs_for(spec: LogSpec) {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(spec.env_filter())
        .try_init()
        .ok();
}
