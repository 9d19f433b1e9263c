//! Gold Miner
//!
//! This example drives a small game agent through a per-tick loop.
//!
//! Key concepts:
//! - Owner data mutated from state hooks
//! - States requesting a transition through the owner
//! - Reverting to the previous state after an interruption
//!
//! Run with: cargo run --example miner

use tinyfsm::{HookError, Machine, MachineBuilder, MachineError, State};

#[derive(Debug, Default)]
struct Miner {
    gold: u32,
    fatigue: u32,
    banked: u32,
    next: Option<&'static str>,
}

struct Digging;

impl State<Miner> for Digging {
    fn key(&self) -> &str {
        "digging"
    }

    fn is_initial_state(&self) -> bool {
        true
    }

    fn enter(&mut self, _owner: &mut Miner) -> Result<(), HookError> {
        println!("  Walking to the mine");
        Ok(())
    }

    fn execute(&mut self, owner: &mut Miner) -> Result<(), HookError> {
        owner.gold += 1;
        owner.fatigue += 1;
        println!("  Dug a nugget ({} carried)", owner.gold);
        if owner.gold >= 3 {
            owner.next = Some("banking");
        } else if owner.fatigue >= 5 {
            owner.next = Some("resting");
        }
        Ok(())
    }
}

struct Banking;

impl State<Miner> for Banking {
    fn key(&self) -> &str {
        "banking"
    }

    fn execute(&mut self, owner: &mut Miner) -> Result<(), HookError> {
        owner.banked += owner.gold;
        owner.gold = 0;
        println!("  Deposited, {} in the bank", owner.banked);
        owner.next = Some("digging");
        Ok(())
    }
}

struct Resting;

impl State<Miner> for Resting {
    fn key(&self) -> &str {
        "resting"
    }

    fn execute(&mut self, owner: &mut Miner) -> Result<(), HookError> {
        owner.fatigue = 0;
        println!("  Napping");
        owner.next = Some("digging");
        Ok(())
    }
}

fn tick(machine: &mut Machine<Miner>) -> Result<(), MachineError> {
    machine.process()?;
    if let Some(next) = machine.owner_mut().next.take() {
        machine.change_state(next)?;
    }
    Ok(())
}

fn main() -> Result<(), MachineError> {
    println!("=== Gold Miner ===\n");

    let mut machine = MachineBuilder::new(Miner::default())
        .state(Digging)
        .state(Banking)
        .state(Resting)
        .build()?;

    for round in 1..=8 {
        println!("Tick {} [{}]", round, machine.current_key().unwrap_or("-"));
        tick(&mut machine)?;
    }

    println!("\nInterrupted for a nap, then back to work:");
    machine.change_state("resting")?;
    machine.revert_to_previous_state()?;
    println!("  Now {}", machine.current_key().unwrap_or("-"));

    println!("\nPath: {}", machine.history().get_path().join(" -> "));
    println!("Final miner: {:?}", machine.owner());
    Ok(())
}
