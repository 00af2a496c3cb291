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

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::sol;

use chain_data::{address_topic, EventLog, LogFilter};

use crate::{ChainConnector, ConnectorError, ContractArtifact, Deployment, FilterOpts, TransactOpts};

sol! {
    /// REN, ERC20 token darknodes bond and fees are paid in
    contract RepublicToken {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);
        event Burn(address indexed burner, uint256 value);
        event Pause();
        event Unpause();
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function INITIAL_SUPPLY() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function balanceOf(address _owner) external view returns (uint256);
        function allowance(address _owner, address _spender) external view returns (uint256);
        function paused() external view returns (bool);
        function owner() external view returns (address);

        function transfer(address _to, uint256 _value) external returns (bool);
        function transferFrom(address _from, address _to, uint256 _value) external returns (bool);
        function approve(address _spender, uint256 _value) external returns (bool);
        function increaseApproval(address _spender, uint256 _addedValue) external returns (bool);
        function decreaseApproval(address _spender, uint256 _subtractedValue) external returns (bool);
        function burn(uint256 _value) external;
        function pause() external;
        function unpause() external;
        function transferOwnership(address newOwner) external;
        function transferTokens(address beneficiary, uint256 amount) external returns (bool);
    }
}

use RepublicToken::*;

bind_contract!(
    /// Binding of the [RepublicToken] ERC20 contract
    RepublicTokenContract
);

impl RepublicTokenContract {
    /// Deploy a new token, the whole initial supply goes to the sender
    pub async fn deploy(
        connector: Arc<ChainConnector>,
        artifact: &ContractArtifact,
        opts: &TransactOpts,
    ) -> Result<(Deployment, Self), ConnectorError> {
        let deployment = connector.deploy(artifact, &[], opts).await?;
        let token = Self::new(connector, deployment.address);
        Ok((deployment, token))
    }

    pub async fn name(&self) -> Result<String, ConnectorError> {
        Ok(self.contract.call(nameCall {}).await?._0)
    }

    pub async fn symbol(&self) -> Result<String, ConnectorError> {
        Ok(self.contract.call(symbolCall {}).await?._0)
    }

    pub async fn decimals(&self) -> Result<u8, ConnectorError> {
        Ok(self.contract.call(decimalsCall {}).await?._0)
    }

    pub async fn initial_supply(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(INITIAL_SUPPLYCall {}).await?._0)
    }

    pub async fn total_supply(&self) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(totalSupplyCall {}).await?._0)
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ConnectorError> {
        Ok(self.contract.call(balanceOfCall { _owner: owner }).await?._0)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ConnectorError> {
        let call = allowanceCall {
            _owner: owner,
            _spender: spender,
        };
        Ok(self.contract.call(call).await?._0)
    }

    pub async fn paused(&self) -> Result<bool, ConnectorError> {
        Ok(self.contract.call(pausedCall {}).await?._0)
    }

    pub async fn owner(&self) -> Result<Address, ConnectorError> {
        Ok(self.contract.call(ownerCall {}).await?._0)
    }

    pub async fn transfer(&self, to: Address, value: U256) -> Result<B256, ConnectorError> {
        self.contract
            .transact(transferCall {
                _to: to,
                _value: value,
            })
            .await
    }

    pub async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(transferFromCall {
                _from: from,
                _to: to,
                _value: value,
            })
            .await
    }

    pub async fn approve(&self, spender: Address, value: U256) -> Result<B256, ConnectorError> {
        self.contract
            .transact(approveCall {
                _spender: spender,
                _value: value,
            })
            .await
    }

    pub async fn increase_approval(
        &self,
        spender: Address,
        added_value: U256,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(increaseApprovalCall {
                _spender: spender,
                _addedValue: added_value,
            })
            .await
    }

    pub async fn decrease_approval(
        &self,
        spender: Address,
        subtracted_value: U256,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(decreaseApprovalCall {
                _spender: spender,
                _subtractedValue: subtracted_value,
            })
            .await
    }

    pub async fn burn(&self, value: U256) -> Result<B256, ConnectorError> {
        self.contract.transact(burnCall { _value: value }).await
    }

    pub async fn pause(&self) -> Result<B256, ConnectorError> {
        self.contract.transact(pauseCall {}).await
    }

    pub async fn unpause(&self) -> Result<B256, ConnectorError> {
        self.contract.transact(unpauseCall {}).await
    }

    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<B256, ConnectorError> {
        self.contract
            .transact(transferOwnershipCall {
                newOwner: new_owner,
            })
            .await
    }

    /// Owner-only transfer used to hand out tokens while the contract is paused
    pub async fn transfer_tokens(
        &self,
        beneficiary: Address,
        amount: U256,
    ) -> Result<B256, ConnectorError> {
        self.contract
            .transact(transferTokensCall {
                beneficiary,
                amount,
            })
            .await
    }

    /// Transfers from any of `from` to any of `to`, empty slices match every address
    pub fn transfer_filter(&self, from: &[Address], to: &[Address]) -> LogFilter {
        self.contract
            .event_filter::<Transfer>()
            .topic1(from.iter().copied().map(address_topic))
            .topic2(to.iter().copied().map(address_topic))
    }

    pub async fn filter_transfer(
        &self,
        opts: &FilterOpts,
        from: &[Address],
        to: &[Address],
    ) -> Result<Vec<EventLog<Transfer>>, ConnectorError> {
        self.contract
            .filter(opts, self.transfer_filter(from, to))
            .await
    }

    pub fn approval_filter(&self, owner: &[Address], spender: &[Address]) -> LogFilter {
        self.contract
            .event_filter::<Approval>()
            .topic1(owner.iter().copied().map(address_topic))
            .topic2(spender.iter().copied().map(address_topic))
    }

    pub async fn filter_approval(
        &self,
        opts: &FilterOpts,
        owner: &[Address],
        spender: &[Address],
    ) -> Result<Vec<EventLog<Approval>>, ConnectorError> {
        self.contract
            .filter(opts, self.approval_filter(owner, spender))
            .await
    }

    pub fn burn_filter(&self, burner: &[Address]) -> LogFilter {
        self.contract
            .event_filter::<Burn>()
            .topic1(burner.iter().copied().map(address_topic))
    }

    pub async fn filter_burn(
        &self,
        opts: &FilterOpts,
        burner: &[Address],
    ) -> Result<Vec<EventLog<Burn>>, ConnectorError> {
        self.contract.filter(opts, self.burn_filter(burner)).await
    }

    pub async fn filter_pause(&self, opts: &FilterOpts) -> Result<Vec<EventLog<Pause>>, ConnectorError> {
        self.contract.events::<Pause>(opts).await
    }

    pub async fn filter_unpause(
        &self,
        opts: &FilterOpts,
    ) -> Result<Vec<EventLog<Unpause>>, ConnectorError> {
        self.contract.events::<Unpause>(opts).await
    }

    pub fn ownership_transferred_filter(
        &self,
        previous_owner: &[Address],
        new_owner: &[Address],
    ) -> LogFilter {
        self.contract
            .event_filter::<OwnershipTransferred>()
            .topic1(previous_owner.iter().copied().map(address_topic))
            .topic2(new_owner.iter().copied().map(address_topic))
    }

    pub async fn filter_ownership_transferred(
        &self,
        opts: &FilterOpts,
        previous_owner: &[Address],
        new_owner: &[Address],
    ) -> Result<Vec<EventLog<OwnershipTransferred>>, ConnectorError> {
        let filter = self.ownership_transferred_filter(previous_owner, new_owner);
        self.contract.filter(opts, filter).await
    }
}
