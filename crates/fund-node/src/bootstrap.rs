//! Deployment of a fresh treasury.
//!
//! The admin deploys the share token, hands its ownership to the fund
//! address, then the fund is constructed around it.

use fund_ledger::{Fund, FundError, ShareToken};
use tracing::info;

use crate::config::FundSection;

/// Deploy a treasury from its configuration section.
pub fn deploy(section: &FundSection) -> Result<Fund, FundError> {
    let config = section.fund_config();
    config.validate()?;

    let deployer = config.admin;
    let mut shares = ShareToken::new(
        section.share_name.clone(),
        section.share_symbol.clone(),
        deployer,
    );
    info!(deployer = %deployer, name = %shares.name(), symbol = %shares.symbol(), "Share token deployed");

    shares.transfer_ownership(deployer, config.address)?;

    let fund = Fund::new(config, shares)?;
    info!(
        fund = %fund.address(),
        admin = %fund.admin(),
        min_deposit = %fund.min_deposit(),
        quorum_percent = fund.quorum_percent(),
        "Fund deployed"
    );

    Ok(fund)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_hands_token_to_fund() {
        let section = FundSection::default();
        let fund = deploy(&section).unwrap();

        assert_eq!(fund.shares().owner(), section.address);
        assert_eq!(fund.admin(), section.admin);
        assert_eq!(fund.quorum_percent(), 75);
        assert_eq!(fund.spending_count(), 0);
        assert!(fund.balance().is_zero());
    }

    #[test]
    fn test_deploy_rejects_bad_quorum() {
        let section = FundSection {
            quorum_percent: 150,
            ..FundSection::default()
        };
        assert!(matches!(deploy(&section), Err(FundError::InvalidConfig(_))));
    }
}
