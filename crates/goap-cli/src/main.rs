//! GOAP scenario runner.
//!
//! - `goap plan <scenario>` - rank the scenario's goals and print the chosen plan
//! - `goap run <scenario>` - drive an agent through the scenario for a number of ticks

mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use goap_core::TickContext;
use goap_planner::{GoapAgent, GoapPlanner};
use goap_tools::{LogTraceSink, Tracer};
use tracing_subscriber::{fmt, EnvFilter};

use crate::scenario::{Built, Scenario};

#[derive(Parser)]
#[command(name = "goap")]
#[command(about = "Plan and simulate goal-oriented agents", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan once against the scenario's initial world
    Plan {
        /// Scenario file (YAML)
        scenario: PathBuf,
    },

    /// Simulate an agent
    Run {
        /// Scenario file (YAML)
        scenario: PathBuf,

        /// Number of ticks to simulate
        #[arg(long, default_value_t = 10)]
        ticks: u64,

        /// Seconds per tick
        #[arg(long, default_value_t = 0.1)]
        dt: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan { scenario } => plan(&scenario, cli.json),
        Commands::Run {
            scenario,
            ticks,
            dt,
        } => run(&scenario, ticks, dt, cli.json),
    }
}

fn plan(path: &Path, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let Built {
        model,
        world,
        goals,
        most_recent,
    } = scenario.build()?;
    tracing::info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        goals = goals.len(),
        actions = model.action_count(),
        "Planning"
    );

    let mut planner = GoapPlanner::new().with_config(scenario.planner);
    let Some(plan) = planner.plan(&model, &world, &goals, most_recent) else {
        if json {
            println!("{}", serde_json::json!({ "plan": null }));
        } else {
            println!("no plan");
        }
        return Ok(());
    };

    let goal = model.goal(plan.goal()).map(|g| g.name()).unwrap_or("?");
    let steps: Vec<&str> = plan
        .steps()
        .into_iter()
        .filter_map(|id| model.action(id).map(|a| a.name()))
        .collect();

    if json {
        let out = serde_json::json!({
            "plan": {
                "goal": goal,
                "cost": plan.total_cost(),
                "steps": steps,
            }
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("goal: {goal}");
        println!("cost: {}", plan.total_cost());
        for (i, step) in steps.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
    planner.release_plan(plan);
    Ok(())
}

fn run(path: &Path, ticks: u64, dt: f32, json: bool) -> Result<()> {
    if !(dt.is_finite() && dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {dt}");
    }

    let scenario = Scenario::load(path)?;
    let Built {
        model, mut world, ..
    } = scenario.build()?;
    tracing::info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        ticks,
        dt,
        "Simulating"
    );

    let planner = GoapPlanner::new().with_config(scenario.planner);
    let mut agent = GoapAgent::new(model)
        .with_config(scenario.agent)
        .with_planner(planner)
        .with_tracer(Tracer::new().with_log().with_sink(LogTraceSink));

    let mut ctx = TickContext::new(0, dt);
    for _ in 0..ticks {
        agent.tick(&ctx, &mut world);
        ctx = ctx.next();
    }

    let log = agent.tracer_mut().take_log().unwrap_or_default();
    let facts: Vec<(&str, bool)> = agent
        .model()
        .beliefs()
        .map(|(id, belief)| (belief.name(), world.fact(id.index())))
        .collect();

    if json {
        let out = serde_json::json!({
            "events": log.events,
            "facts": facts,
            "stats": {
                "plans_found": agent.stats().plans_found,
                "actions_completed": agent.stats().actions_completed,
                "actions_aborted": agent.stats().actions_aborted,
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for event in &log.events {
        println!("[{:>4}] {:<22} a={} b={}", event.tick, event.tag, event.a, event.b);
    }
    println!();
    for (name, value) in facts {
        println!("{name}: {value}");
    }
    let stats = agent.stats();
    println!(
        "plans found: {}, actions completed: {}, aborted: {}",
        stats.plans_found, stats.actions_completed, stats.actions_aborted
    );
    Ok(())
}
