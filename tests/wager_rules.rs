// Pure rules of the wager lifecycle: outcome decision, payout arithmetic,
// and the string domains that guard the ledger columns.

use deathwatch_server::db::models::{BetStatus, CharacterStatus, Prediction};
use deathwatch_server::settlement::WIN_MULTIPLIER;
use std::str::FromStr;

#[test]
fn prediction_decides_outcome() {
    // wins if (died AND dies) OR (NOT died AND survives)
    assert!(Prediction::Dies.wins(true));
    assert!(Prediction::Survives.wins(false));
    assert!(!Prediction::Dies.wins(false));
    assert!(!Prediction::Survives.wins(true));
}

#[test]
fn even_money_payout() {
    let stake = 300_i64;
    let balance_after_placement = 1000 - stake;
    let credited = stake * WIN_MULTIPLIER;

    // Starting from 1000: placement leaves 700, a win brings it to 1300.
    assert_eq!(balance_after_placement, 700);
    assert_eq!(balance_after_placement + credited, 1300);
}

#[test]
fn prediction_round_trips() {
    for p in [Prediction::Dies, Prediction::Survives] {
        assert_eq!(Prediction::from_str(p.as_str()), Ok(p));
        assert_eq!(p.to_string(), p.as_str());
    }
    assert!(Prediction::from_str("maybe").is_err());
    assert!(Prediction::from_str("DIES").is_err());
    assert!(Prediction::from_str("").is_err());
}

#[test]
fn bet_status_round_trips() {
    for s in [
        BetStatus::Pending,
        BetStatus::Won,
        BetStatus::Lost,
        BetStatus::Refunded,
    ] {
        assert_eq!(BetStatus::from_str(s.as_str()), Ok(s));
    }
    assert!(BetStatus::from_str("cancelled").is_err());
}

#[test]
fn character_status_round_trips() {
    for s in [
        CharacterStatus::Alive,
        CharacterStatus::Dead,
        CharacterStatus::Unknown,
    ] {
        assert_eq!(CharacterStatus::from_str(s.as_str()), Ok(s));
    }
    assert!(CharacterStatus::from_str("undead").is_err());
}

#[test]
fn prediction_serde_is_lowercase() {
    assert_eq!(
        serde_json::to_string(&Prediction::Dies).unwrap(),
        "\"dies\""
    );
    let p: Prediction = serde_json::from_str("\"survives\"").unwrap();
    assert_eq!(p, Prediction::Survives);
}
