//! Robot State Tree
//!
//! This example drives a small robot through a hierarchical state tree.
//!
//! Key concepts:
//! - Relative and absolute transition paths
//! - Events bubbling from the active state to its ancestors
//! - Initial substates entered automatically
//! - Checkpointing the active path
//!
//! Run with: cargo run --example robot

use statetree::builder::{transition_to, StateBuilder};
use statetree::manager::StateManager;
use statetree::state_tree;

fn announce(name: &'static str) -> StateBuilder {
    StateBuilder::new()
        .on_enter(move |_, _| {
            println!("  enter {name}");
            Ok(())
        })
        .on_exit(move |_, _| {
            println!("  exit  {name}");
            Ok(())
        })
}

fn main() {
    println!("=== Robot State Tree ===\n");

    let states = state_tree! {
        "poweredDown" => announce("poweredDown")
            .initial_state("charging")
            .action("boot", transition_to("poweredUp"))
            .child(
                "charging",
                announce("charging").action("chargeComplete", transition_to("charged")),
            )
            .child("charged", announce("charged")),
        "poweredUp" => announce("poweredUp")
            .initial_state("stationary")
            .action("shutdown", transition_to("poweredDown"))
            .child("stationary", announce("stationary").action("move", transition_to("mobile")))
            .child("mobile", announce("mobile").action("halt", transition_to("stationary"))),
    };

    let mut robot = StateManager::builder()
        .initial_state("poweredDown")
        .states(states)
        .build()
        .unwrap();
    println!("Active: {:?}\n", robot.current_path());

    for event in ["chargeComplete", "boot", "move", "halt", "shutdown"] {
        println!("send {event}");
        robot.send(event, &[]).unwrap();
        println!("Active: {:?}\n", robot.current_path());
    }

    match robot.send("move", &[]) {
        Ok(_) => println!("Unexpectedly handled 'move' while powered down"),
        Err(err) => println!("Rejected: {err}\n"),
    }

    let checkpoint = robot.checkpoint();
    println!("Checkpoint: {}", checkpoint.to_json().unwrap());
    println!("Visited: {:?}", robot.history().get_path());

    println!("\n=== Example Complete ===");
}
