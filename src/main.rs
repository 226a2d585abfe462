//! Fantasy league core simulation.
//!
//! Walks a full season slice: registration, drafting, weekly transfers,
//! gameweek scoring, forum activity, the json envelope and racing writers.

use fpl_core::logger::{init_logger, level_from_str};
use fpl_core::*;
use rust_decimal_macros::dec;
use std::error::Error;

type DemoResult = Result<(), Box<dyn Error>>;

fn main() -> DemoResult {
    let level = std::env::var("FPL_LOG").map_or(tracing::Level::WARN, |v| level_from_str(&v));
    init_logger(level)?;

    println!("Fantasy League Core Simulation");
    println!("Six-a-side, 50.0 ceiling, one free transfer per gameweek\n");

    scenario_1_registration()?;
    scenario_2_drafting()?;
    scenario_3_transfers()?;
    scenario_4_gameweeks()?;
    scenario_5_forum()?;
    scenario_6_json_envelope()?;
    scenario_7_racing_transfers()?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

// ids are assigned in insertion order, 1..=15. the rosters below are six-a-side,
// so the ruleset is pinned rather than read from FPL_RULESET
fn demo_engine() -> Result<Engine, Box<dyn Error>> {
    let game = GameConfig::default().with_admin_key("demo-admin");
    let engine = Engine::new(game, EngineConfig::default())?;
    let players = [
        ("Raya", "ARS", Position::Goalkeeper, dec!(4.0)),
        ("Gabriel", "ARS", Position::Defender, dec!(5.0)),
        ("Saliba", "ARS", Position::Defender, dec!(5.0)),
        ("Saka", "ARS", Position::Midfielder, dec!(8.0)),
        ("Palmer", "CHE", Position::Midfielder, dec!(8.5)),
        ("Haaland", "MCI", Position::Forward, dec!(12.0)),
        ("Mbeumo", "MUN", Position::Midfielder, dec!(7.0)),
        ("Rice", "ARS", Position::Midfielder, dec!(9.5)),
        ("Salah", "LIV", Position::Midfielder, dec!(10.5)),
        ("Isak", "LIV", Position::Forward, dec!(9.0)),
        ("Alisson", "LIV", Position::Goalkeeper, dec!(5.5)),
        ("Gvardiol", "MCI", Position::Defender, dec!(6.0)),
        ("Watkins", "AVL", Position::Forward, dec!(8.5)),
        ("Van Dijk", "LIV", Position::Defender, dec!(6.0)),
        ("Mbappe", "RMA", Position::Forward, dec!(20.7)),
    ];
    for (name, club, position, price) in players {
        engine.add_player(NewPlayer::new(name, club, position, Price::new_unchecked(price)))?;
    }
    Ok(engine)
}

/// Agents register, get credentials and a claim link.
fn scenario_1_registration() -> DemoResult {
    println!("Scenario 1: Registration and Claim\n");

    let engine = demo_engine()?;
    let breakdown = engine.store().players()?.position_breakdown();
    let counts: Vec<String> = breakdown.iter().map(|(pos, n)| format!("{n} {pos}")).collect();
    println!("  Catalog: {}", counts.join(", "));

    let reg = engine.register_agent("Scout", "Cheap defenders, premium forwards")?;
    println!("  Registered {} (agent {})", reg.name, reg.agent_id);
    println!("  Starting budget: {}", reg.budget);
    println!("  Claim link: {}", reg.claim_url);

    match engine.register_agent("SCOUT", "same name, louder") {
        Err(err) => println!("  Duplicate name rejected: {err}"),
        Ok(_) => println!("  Duplicate name accepted?"),
    }

    let agent = engine.claim_agent(&reg.claim_token, Some("owner@example.com".into()))?;
    println!("  Claimed by {:?}, status {:?}", agent.owner_email, agent.claim_status);

    let authed = engine.authenticate(&format!("Bearer {}", reg.api_key))?;
    println!("  Bearer credential resolves to {}\n", authed.name);
    Ok(())
}

/// Squad validation: accepted roster, over budget, broken formation.
fn scenario_2_drafting() -> DemoResult {
    println!("Scenario 2: Squad Drafting\n");

    let engine = demo_engine()?;
    let agent = engine.register_agent("Drafter", "Follows the template")?.agent_id;

    let squad = engine.submit_squad(agent, &["1", "2", "3", "4", "5", "6"])?;
    println!("  Accepted squad totals {}, remaining {}", squad.total_cost, squad.remaining_budget);

    for (label, ids) in [
        ("Over budget", ["1", "2", "3", "4", "5", "15"]),
        ("No midfielders", ["1", "2", "3", "6", "10", "13"]),
        ("Duplicate entry", ["1", "2", "2", "4", "5", "6"]),
        ("Unknown player", ["1", "2", "3", "4", "5", "99"]),
    ] {
        match engine.submit_squad(agent, &ids) {
            Err(EngineError::Validation(err)) => {
                println!("  {label}: {} ({:?})", err.title(), err.kind());
                println!("    hint: {}", err.hint());
            }
            Err(err) => println!("  {label}: {err}"),
            Ok(_) => println!("  {label}: accepted?"),
        }
    }

    let view = engine.team_view(agent)?;
    println!("  Team unchanged after rejections: {} players, {}\n", view.players.len(), view.total_cost);
    Ok(())
}

/// One like-for-like swap per gameweek.
fn scenario_3_transfers() -> DemoResult {
    println!("Scenario 3: Weekly Transfers\n");

    let engine = demo_engine()?;
    let agent = engine.register_agent("Trader", "Chases form")?.agent_id;
    let squad = engine.submit_squad(agent, &["1", "2", "3", "7", "8", "6"])?;
    println!("  Squad costs {}", squad.total_cost);

    match engine.request_transfer(agent, "7", "10") {
        Err(err) => println!("  MID for FWD rejected: {err}"),
        Ok(_) => println!("  MID for FWD accepted?"),
    }

    let result = engine.request_transfer(agent, "7", "9")?;
    println!(
        "  {} ({}) out, {} ({}) in",
        result.transfer.out.name, result.transfer.out.price, result.transfer.incoming.name, result.transfer.incoming.price
    );
    println!("  New total {}, remaining {}", result.total_cost, result.remaining_budget);

    match engine.request_transfer(agent, "6", "13") {
        Err(EngineError::Validation(err)) => println!("  Second transfer: {}", err.hint()),
        Err(err) => println!("  Second transfer: {err}"),
        Ok(_) => println!("  Second transfer accepted?"),
    }

    engine.on_simulation_complete(PeriodId(1))?;
    let result = engine.request_transfer(agent, "6", "13")?;
    println!("  After GW1 closes: {} in, remaining {}\n", result.transfer.incoming.name, result.remaining_budget);
    Ok(())
}

/// Points come in, scores are recomputed, repeats are refused.
fn scenario_4_gameweeks() -> DemoResult {
    println!("Scenario 4: Gameweek Simulation\n");

    let engine = demo_engine()?;
    let a = engine.register_agent("Alpha", "template team")?.agent_id;
    let b = engine.register_agent("Bravo", "differentials")?.agent_id;
    engine.submit_squad(a, &["1", "2", "3", "4", "5", "6"])?;
    engine.submit_squad(b, &["11", "12", "14", "7", "9", "10"])?;

    let mut source = RandomPoints::seeded(2024);
    for gw in 1..=3 {
        let result = engine.run_gameweek(PeriodId(gw), &mut source)?;
        println!("  {} ({} players scored)", result.period, result.players_awarded);
        for line in result.leaderboard.iter() {
            println!("    {:<8} {:>4} pts", line.name, line.score);
        }
    }

    match engine.run_gameweek(PeriodId(3), &mut source) {
        Err(err) => println!("  Re-running GW3 refused: {err}"),
        Ok(_) => println!("  Re-running GW3 accepted?"),
    }

    let top = engine.run_gameweek(PeriodId(4), &mut FixedPoints::new())?.top_scorers;
    if let Some(best) = top.first() {
        println!("  Season top scorer: {} ({}) {} pts\n", best.name, best.club, best.total_points);
    }
    Ok(())
}

fn scenario_5_forum() -> DemoResult {
    println!("Scenario 5: Forum\n");

    let engine = demo_engine()?;
    let a = engine.register_agent("Alpha", "template team")?.agent_id;
    let b = engine.register_agent("Bravo", "differentials")?.agent_id;

    let post = engine.create_post(a, "Captaining Haaland again. Fight me.")?;
    engine.create_post(b, "Isak differential is the play this week.")?;
    engine.upvote_post(&post.id.to_string())?;

    if let Err(err) = engine.create_post(b, &"x".repeat(501)) {
        println!("  Long post rejected: {err}");
    }
    for view in engine.list_posts()? {
        println!("  [{}] {}: {} (+{})", view.id, view.author, view.content, view.upvotes);
    }
    println!();
    Ok(())
}

/// The same flow through the json command layer.
fn scenario_6_json_envelope() -> DemoResult {
    println!("Scenario 6: JSON Envelope\n");

    let engine = demo_engine()?;
    let reg = api::handle_json(&engine, None, r#"{"action":"register_agent","name":"Envelope","description":"speaks json"}"#);
    println!("  {} {}", reg.status, reg.body["data"]["agent"]["name"]);

    let key = reg.body["data"]["agent"]["api_key"].as_str().unwrap_or_default().to_string();
    let auth = format!("Bearer {key}");

    let bad = api::handle_json(&engine, Some(&auth), r#"{"action":"submit_squad","playerIds":["1","2","3","4","5","15"]}"#);
    println!("  {} {}", bad.status, bad.body);

    let good = api::handle_json(&engine, Some(&auth), r#"{"action":"submit_squad","playerIds":["1","2","3","4","5","6"]}"#);
    println!("  {} remaining {}", good.status, good.body["data"]["team"]["remainingBudget"]);

    let denied = api::query(&engine, None, EngineQuery::Team);
    println!("  {} {}\n", denied.status, denied.body["error"]);
    Ok(())
}

/// Several writers race for the same free transfer; exactly one wins.
fn scenario_7_racing_transfers() -> DemoResult {
    println!("Scenario 7: Racing Transfers\n");

    let engine = demo_engine()?;
    let agent = engine.register_agent("Racer", "clicks twice")?.agent_id;
    engine.submit_squad(agent, &["1", "2", "3", "7", "8", "6"])?;

    let incoming = ["9", "4", "5"];
    let outcomes: Vec<Result<TransferResult, EngineError>> = std::thread::scope(|s| {
        let handles: Vec<_> = incoming
            .iter()
            .map(|id| {
                let engine = &engine;
                s.spawn(move || engine.request_transfer(agent, "7", id))
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .collect()
    });

    let wins = outcomes.iter().filter(|o| o.is_ok()).count();
    println!("  {} writers, {} succeeded", incoming.len(), wins);
    for err in outcomes.iter().filter_map(|o| o.as_ref().err()) {
        println!("    lost: {err}");
    }
    let team = engine.team_view(agent)?;
    println!("  Final total {}, transfer available: {}", team.total_cost, team.transfer_available);
    Ok(())
}
