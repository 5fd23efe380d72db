//! End-to-end governance scenarios against the public `Fund` API.

use fund_ledger::{Ballot, Fund, FundConfig, FundError, FundEvent, ShareToken};
use fund_types::{Address, U256};

fn wei(n: u128) -> U256 {
    U256::from(n)
}

const E16: u128 = 10_000_000_000_000_000;
const E17: u128 = 100_000_000_000_000_000;
const E18: u128 = 1_000_000_000_000_000_000;

struct Accounts {
    admin: Address,
    second: Address,
    recipient: Address,
}

fn accounts() -> Accounts {
    Accounts {
        admin: Address::derive(b"admin"),
        second: Address::derive(b"second"),
        recipient: Address::derive(b"recipient"),
    }
}

/// Deploy with a 1e17 minimum and 75% quorum, the way the bootstrap does.
fn deploy() -> (Fund, Accounts) {
    let acc = accounts();
    let fund_address = Address::derive(b"fund");
    let mut shares = ShareToken::new("Fund Share", "FSH", acc.admin);
    shares.transfer_ownership(acc.admin, fund_address).unwrap();

    let config = FundConfig {
        address: fund_address,
        admin: acc.admin,
        min_deposit: wei(E17),
        quorum_percent: 75,
    };
    (Fund::new(config, shares).unwrap(), acc)
}

#[test]
fn deposit_must_match_paid_value() {
    let (mut fund, acc) = deploy();
    let err = fund.deposit(acc.admin, wei(E17), wei(E18)).unwrap_err();
    assert_eq!(
        err,
        FundError::AmountMismatch {
            declared: wei(E17),
            paid: wei(E18),
        }
    );
    assert_eq!(fund.stake_of(&acc.admin), U256::ZERO);
    assert_eq!(fund.balance(), U256::ZERO);
}

#[test]
fn first_deposit_below_minimum_is_rejected() {
    let (mut fund, acc) = deploy();
    let err = fund.deposit(acc.second, wei(E16), wei(E16)).unwrap_err();
    assert!(matches!(err, FundError::BelowMinimum { .. }));
    assert!(!fund.is_stakeholder(&acc.second));
    assert!(fund.events().is_empty());
}

#[test]
fn small_top_up_after_minimum_is_accepted() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.deposit(acc.admin, wei(E16), wei(E16)).unwrap();
    assert_eq!(fund.stake_of(&acc.admin), wei(E17 + E16));
    assert_eq!(fund.total_stake(), wei(E17 + E16));
}

#[test]
fn deposit_event_carries_participant_and_amount() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    assert_eq!(
        fund.events(),
        &[FundEvent::Deposit {
            participant: acc.admin,
            amount: wei(E17),
        }]
    );
}

#[test]
fn spending_request_is_recorded_with_event() {
    let (mut fund, acc) = deploy();
    let index = fund
        .create_spending(acc.admin, acc.recipient, wei(E18), "Buy a laptop")
        .unwrap();

    assert_eq!(index, 0);
    let request = fund.spending(0).unwrap();
    assert_eq!(request.description, "Buy a laptop");
    assert_eq!(request.amount, wei(E18));
    assert_eq!(
        fund.events().last(),
        Some(&FundEvent::NewSpending {
            recipient: acc.recipient,
            amount: wei(E18),
        })
    );
}

#[test]
fn non_admin_cannot_create() {
    let (mut fund, acc) = deploy();
    assert_eq!(
        fund.create_spending(acc.second, acc.recipient, wei(E18), "Buy a laptop"),
        Err(FundError::NotAdmin(acc.second))
    );
}

#[test]
fn only_stakeholders_vote_once_on_existing_requests() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.create_spending(acc.admin, acc.recipient, wei(E18), "Buy a laptop")
        .unwrap();

    assert_eq!(
        fund.approve_spending(acc.second, 0, Ballot::Yes),
        Err(FundError::NotStakeholder(acc.second))
    );
    assert_eq!(
        fund.approve_spending(acc.admin, 1, Ballot::Yes),
        Err(FundError::NotFound { index: 1, count: 1 })
    );

    fund.approve_spending(acc.admin, 0, Ballot::Yes).unwrap();
    assert_eq!(
        fund.approve_spending(acc.admin, 0, Ballot::No),
        Err(FundError::DoubleVote {
            voter: acc.admin,
            index: 0,
        })
    );

    let request = fund.spending(0).unwrap();
    assert_eq!(request.vote_count(), 1);
    assert_eq!(request.yes_weight, wei(E17));
}

#[test]
fn sole_stakeholder_approves_alone() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.create_spending(acc.admin, acc.recipient, wei(E18), "Buy a laptop")
        .unwrap();

    assert!(fund.approve_spending(acc.admin, 0, Ballot::Yes).unwrap());

    let request = fund.spending(0).unwrap();
    assert_eq!(request.yes_count, 1);
    assert_eq!(request.yes_weight, wei(E17));
    assert!(request.approved);
}

#[test]
fn small_holder_cannot_carry_quorum() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.deposit(acc.second, wei(E18), wei(E18)).unwrap();
    fund.create_spending(acc.admin, acc.recipient, wei(E18), "Buy a laptop multi")
        .unwrap();

    fund.approve_spending(acc.admin, 0, Ballot::Yes).unwrap();
    fund.approve_spending(acc.second, 0, Ballot::No).unwrap();

    let request = fund.spending(0).unwrap();
    assert_eq!(request.yes_count, 1);
    assert_eq!(request.yes_weight, wei(E17));
    assert!(!request.approved);
    assert_eq!(
        fund.execute_spending(acc.admin, 0).unwrap_err(),
        FundError::QuorumNotMet(0)
    );
}

#[test]
fn large_holder_carries_quorum() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.deposit(acc.second, wei(E18), wei(E18)).unwrap();
    fund.create_spending(acc.admin, acc.recipient, wei(E18), "Buy a laptop multi")
        .unwrap();

    fund.approve_spending(acc.admin, 0, Ballot::No).unwrap();
    fund.approve_spending(acc.second, 0, Ballot::Yes).unwrap();

    let request = fund.spending(0).unwrap();
    assert_eq!(request.yes_count, 1);
    assert_eq!(request.yes_weight, wei(E18));
    assert_eq!(request.no_weight, wei(E17));
    assert!(request.approved);
}

#[test]
fn approval_drops_when_new_stake_arrives() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.create_spending(acc.admin, acc.recipient, wei(E16), "Coffee")
        .unwrap();
    assert!(fund.approve_spending(acc.admin, 0, Ballot::Yes).unwrap());

    // A new stakeholder dilutes the yes share; their "no" vote re-evaluates
    // against the larger total: 1e17 / 1.1e18 = 9%.
    fund.deposit(acc.second, wei(E18), wei(E18)).unwrap();
    assert!(!fund.approve_spending(acc.second, 0, Ballot::No).unwrap());
    assert!(!fund.spending(0).unwrap().approved);
}

#[test]
fn weight_is_read_at_vote_time() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.create_spending(acc.admin, acc.recipient, wei(E16), "Coffee")
        .unwrap();
    fund.approve_spending(acc.admin, 0, Ballot::Yes).unwrap();

    // Later deposits do not retroactively raise a cast vote.
    fund.deposit(acc.admin, wei(E18), wei(E18)).unwrap();
    assert_eq!(fund.spending(0).unwrap().yes_weight, wei(E17));
}

#[test]
fn under_funded_request_cannot_execute() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E17), wei(E17)).unwrap();
    fund.deposit(acc.second, wei(E18), wei(E18)).unwrap();
    let amount = wei(30u128.pow(18));
    fund.create_spending(acc.admin, acc.recipient, amount, "Buy a laptop multi")
        .unwrap();
    fund.approve_spending(acc.admin, 0, Ballot::Yes).unwrap();
    fund.approve_spending(acc.second, 0, Ballot::Yes).unwrap();

    let err = fund.execute_spending(acc.admin, 0).unwrap_err();
    assert!(matches!(err, FundError::InsufficientBalance { .. }));
    assert!(!fund.spending(0).unwrap().executed);
    assert_eq!(fund.balance(), wei(E17 + E18));
}

#[test]
fn execution_pays_recipient_once() {
    let (mut fund, acc) = deploy();
    fund.deposit(acc.admin, wei(E18), wei(E18)).unwrap();
    fund.create_spending(acc.admin, acc.recipient, wei(500), "Buy a laptop")
        .unwrap();
    fund.approve_spending(acc.admin, 0, Ballot::Yes).unwrap();

    fund.execute_spending(acc.admin, 0).unwrap();
    assert_eq!(fund.balance(), wei(E18 - 500));
    assert_eq!(fund.paid_to(&acc.recipient), wei(500));
    assert!(fund.spending(0).unwrap().executed);

    assert_eq!(
        fund.execute_spending(acc.admin, 0).unwrap_err(),
        FundError::AlreadyExecuted(0)
    );
    assert_eq!(fund.balance(), wei(E18 - 500));
    assert_eq!(fund.transfers().len(), 1);
    assert_eq!(
        fund.events().last(),
        Some(&FundEvent::SpendingExecuted {
            executor: acc.admin,
            index: 0,
        })
    );
}

#[test]
fn listing_returns_requests_in_order() {
    let (mut fund, acc) = deploy();
    for i in 0..4u128 {
        fund.create_spending(acc.admin, acc.recipient, wei(i + 1), format!("request {i}"))
            .unwrap();
    }
    let page = fund.spendings(1, 10);
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].description, "request 1");
    assert_eq!(page[2].amount, wei(4));
}
