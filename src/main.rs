use clap::Parser;
use log::{error, info};
use parlor::config::{RoomConfig, RoomId, FIXED_DT};
use parlor::input::InputSnapshot;
use parlor::Session;

#[derive(Parser)]
#[command(name = "parlor", about = "Minigame parlor core (headless scripted run)")]
struct Args {
    /// Idle frames to simulate after the scripted dice round.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// RNG seed; omitted means a random roll every run.
    #[arg(long)]
    seed: Option<u64>,
    /// Starting bankroll.
    #[arg(long, default_value_t = 100)]
    bankroll: u32,
    /// Stake for the scripted dice wager.
    #[arg(long, default_value_t = 10)]
    stake: u32,
}

/// Drives one scripted visit to the dice room: walk up to the table, bet the
/// stake on a total of 7, roll, and report. Exercises the same frame loop a
/// windowed front end would run.
fn main() {
    env_logger::init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("seed {seed}, bankroll {}", args.bankroll);

    let mut session = Session::new(seed, args.bankroll).expect("built-in rooms must validate");

    session
        .teleport_to_room(RoomId::Dice)
        .expect("built-in rooms must validate");

    // Walk forward until the table zone is in range.
    let zone = RoomConfig::get(RoomId::Dice)
        .zone
        .expect("dice room has a zone");
    let walk = InputSnapshot {
        forward: true,
        ..InputSnapshot::locked()
    };
    let mut frames = 0;
    while frames < 600 {
        let position = session.player_position();
        let dx = position.x - zone.center.x;
        let dz = position.z - zone.center.z;
        if (dx * dx + dz * dz).sqrt() < 5.0 {
            break;
        }
        session.frame(&walk, FIXED_DT).expect("frame failed");
        frames += 1;
    }

    let interact = InputSnapshot {
        interact: true,
        ..InputSnapshot::locked()
    };
    session.frame(&interact, FIXED_DT).expect("frame failed");
    if !session.hud().minigame_focused {
        error!("never reached the dice table");
        return;
    }
    session
        .frame(&InputSnapshot::locked(), FIXED_DT)
        .expect("frame failed");

    if let Err(err) = session.place_dice_wager(args.stake, 7) {
        error!("wager rejected: {err}");
        return;
    }
    if let Err(err) = session.request_roll() {
        error!("roll rejected: {err}");
        return;
    }

    let idle = InputSnapshot::locked();
    while session.hud().dice_rolling {
        session.frame(&idle, FIXED_DT).expect("frame failed");
    }

    let hud = session.hud();
    match hud.last_roll {
        Some(roll) => println!(
            "rolled {} + {} = {} ({}), balance {} -> {}",
            roll.values[0],
            roll.values[1],
            roll.total,
            if roll.total == 7 { "win" } else { "loss" },
            args.bankroll,
            hud.balance,
        ),
        None => println!("roll never resolved, balance {}", hud.balance),
    }

    for _ in 0..args.frames {
        session.frame(&idle, FIXED_DT).expect("frame failed");
    }
    info!("done after {} extra frames", args.frames);
}
