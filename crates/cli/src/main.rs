use anyhow::{bail, Context};
use grail_agent::{write_json, BattleRunner, SimDevice, SimVision};
use grail_core::{AgentConfig, BattleOptions, BattleRecord, Positions, SupportOptions, Timing};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
struct CliOptions {
    plan: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    simulate: Option<Vec<u32>>,
    runs: u32,
    report: Option<PathBuf>,
}

const USAGE: &str = "usage: grail-cli <plan.json> [--config <dir>] \
[--simulate <turns,per,wave>] [--runs <n>] [--report <path>]";

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions {
        runs: 1,
        ..CliOptions::default()
    };
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--config" => {
                let value = args.get(idx + 1).context("--config needs a directory")?;
                options.config_dir = Some(PathBuf::from(value));
                idx += 1;
            }
            "--simulate" => {
                let value = args.get(idx + 1).context("--simulate needs a wave spec")?;
                let waves = value
                    .split(',')
                    .map(|part| part.trim().parse::<u32>())
                    .collect::<Result<Vec<_>, _>>()
                    .with_context(|| format!("bad wave spec {value:?}"))?;
                if waves.is_empty() {
                    bail!("bad wave spec {value:?}");
                }
                options.simulate = Some(waves);
                idx += 1;
            }
            "--runs" => {
                let value = args.get(idx + 1).context("--runs needs a count")?;
                options.runs = value
                    .parse()
                    .with_context(|| format!("bad run count {value:?}"))?;
                idx += 1;
            }
            "--report" => {
                let value = args.get(idx + 1).context("--report needs a path")?;
                options.report = Some(PathBuf::from(value));
                idx += 1;
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if options.plan.is_none() && !other.starts_with('-') => {
                options.plan = Some(PathBuf::from(other));
            }
            other => bail!("unknown argument {other:?}\n{USAGE}"),
        }
        idx += 1;
    }
    Ok(options)
}

fn load_json<T: DeserializeOwned>(path: PathBuf) -> anyhow::Result<T> {
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: PathBuf) -> anyhow::Result<T> {
    if path.exists() {
        load_json(path)
    } else {
        Ok(T::default())
    }
}

fn load_agent_config(dir: &Path) -> anyhow::Result<AgentConfig> {
    let positions: Positions = load_json_or_default(dir.join("positions.json"))?;
    let timing: Timing = load_json_or_default(dir.join("timing.json"))?;
    let battle: BattleOptions = load_json_or_default(dir.join("battle.json"))?;
    let support: SupportOptions = load_json_or_default(dir.join("support.json"))?;
    Ok(AgentConfig {
        positions,
        timing,
        battle,
        support,
    })
}

fn load_plan(path: &Path) -> anyhow::Result<BattleRecord> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let record =
        BattleRecord::from_json(&raw).with_context(|| format!("decode {}", path.display()))?;
    Ok(record)
}

fn print_plan_summary(record: &BattleRecord) {
    println!(
        "plan/谱面 {} | quest/关卡 {} | by/作者 {}",
        record.id, record.quest_id, record.username
    );
    if let Some(team) = record.team.as_ref() {
        println!(
            "team/队伍: {} on field/在场, mystic code/魔术礼装 {}",
            team.on_field_svts.len(),
            team.mystic_code.mystic_code_id
        );
    }
    println!(
        "actions/动作 {} -> turns/回合 {}",
        record.actions.len(),
        record.turns().len()
    );
    for turn in record.turns() {
        let cards: usize = turn.attacks.iter().map(|action| action.attacks.len()).sum();
        println!(
            "  turn/回合 {:>2}: skills/技能={} cards/出卡={}",
            turn.number,
            turn.skills.len(),
            cards
        );
    }
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let Some(plan_path) = options.plan.as_ref() else {
        bail!("{USAGE}");
    };
    let record = load_plan(plan_path)?;
    print_plan_summary(&record);

    let mut config = match options.config_dir.as_ref() {
        Some(dir) => load_agent_config(dir)?,
        None => AgentConfig::default(),
    };

    let Some(waves) = options.simulate.as_ref() else {
        return Ok(());
    };

    // Dry run: replay the plan against the scripted harness, no device.
    config.timing = Timing::immediate();
    let runs = options.runs.max(1);
    let mut vision = SimVision::new();
    for _ in 0..runs {
        vision.script_run(waves);
    }
    vision.continue_prompts = runs - 1;

    let runner = BattleRunner::new(SimDevice::new(), vision, config, record);
    let report = runner
        .run()
        .map_err(|err| anyhow::anyhow!("dry run failed: {err}"))?;

    println!();
    println!("{}", report.to_text_report());
    if let Some(path) = options.report.as_ref() {
        write_json(path, &report).map_err(|err| anyhow::anyhow!("write report: {err}"))?;
        println!("report written/报告已写入: {}", path.display());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("GRAIL_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_cli_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
