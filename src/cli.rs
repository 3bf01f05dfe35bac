//! Command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use scc_core::actions::parse_action;
use scc_core::config::AppConfig;
use scc_core::input::{OutputEvent, PadStickTrigger, RecordingMapper, SCButton};
use scc_core::profile::{profile_from_json, Profile};

/// Inspect and exercise SC-Controller profiles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "scc-core.yaml")]
    pub config: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Prefer deck override bindings
    #[arg(long)]
    pub apply_overrides: bool,

    /// Swap left and right grip lookups
    #[arg(long)]
    pub fixed_grip: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every bound slot of a profile
    Dump {
        /// Profile file (defaults to `profile` from the config)
        profile: Option<PathBuf>,

        /// Print the profile as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Parse an action and print its canonical form
    Parse {
        /// Action text, e.g. "mode(LB, button(KEY_A), button(KEY_B))"
        action: String,
    },

    /// Send events to a profile and print the output they produce
    Simulate {
        /// Profile file (defaults to `profile` from the config)
        profile: Option<PathBuf>,

        /// Buttons held while events are sent
        #[arg(long, value_delimiter = ',')]
        hold: Vec<String>,

        /// Press and release this button
        #[arg(long)]
        button: Option<String>,

        /// Move the stick to X,Y
        #[arg(long, value_delimiter = ',', num_args = 2, allow_hyphen_values = true)]
        stick: Option<Vec<i16>>,

        /// Pull the left trigger to this position
        #[arg(long)]
        trigger_left: Option<u8>,

        /// Pull the right trigger to this position
        #[arg(long)]
        trigger_right: Option<u8>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

/// Settings merged from the config file and command line flags
pub struct Settings {
    pub config: AppConfig,
    pub apply_overrides: bool,
    pub fixed_grip: bool,
}

impl Settings {
    pub fn new(args: &Args, config: AppConfig) -> Self {
        Self {
            apply_overrides: args.apply_overrides || config.apply_overrides,
            fixed_grip: args.fixed_grip || config.fixed_grip_indexing,
            config,
        }
    }

    fn load_profile(&self, path: Option<&PathBuf>) -> Result<Profile> {
        let path = path
            .or(self.config.profile.as_ref())
            .context("No profile given and none set in config")?;
        info!("Loading profile: {}", path.display());

        let mut profile = profile_from_json(path, self.apply_overrides)
            .with_context(|| format!("Failed to load profile: {}", path.display()))?;
        profile.set_fixed_grip_indexing(self.fixed_grip);
        Ok(profile)
    }
}

pub fn run(command: &Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Dump { profile, json } => {
            let profile = settings.load_profile(profile.as_ref())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&profile.to_json())?);
            } else {
                for (key, action) in profile.bindings() {
                    println!("{:<12} {}", key, action);
                }
                if profile.overrides_applied() {
                    println!("(deck overrides applied)");
                }
            }
        },
        Command::Parse { action } => {
            let action =
                parse_action(action).with_context(|| format!("Invalid action: {}", action))?;
            println!("{}", action);
        },
        Command::Simulate {
            profile,
            hold,
            button,
            stick,
            trigger_left,
            trigger_right,
            json,
        } => {
            let profile = settings.load_profile(profile.as_ref())?;
            let events = simulate(
                &profile,
                hold,
                button.as_deref(),
                stick.as_deref(),
                [*trigger_left, *trigger_right],
            )?;
            for event in events {
                if *json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    println!("{}", event);
                }
            }
        },
    }
    Ok(())
}

fn parse_button(name: &str) -> Result<SCButton> {
    SCButton::from_name(name).with_context(|| format!("Unknown button: {}", name))
}

/// Dispatch the requested events and collect what the profile produces
fn simulate(
    profile: &Profile,
    hold: &[String],
    button: Option<&str>,
    stick: Option<&[i16]>,
    triggers: [Option<u8>; 2],
) -> Result<Vec<OutputEvent>> {
    let mut held = SCButton::empty();
    for name in hold {
        held |= parse_button(name)?;
    }
    let mut mapper = RecordingMapper::with_held(held);
    debug!("Simulating with held buttons: {:?}", held);

    if let Some(name) = button {
        let action = profile.get_button(parse_button(name)?);
        action.button_press(&mut mapper);
        action.button_release(&mut mapper);
    }

    if let Some(&[x, y]) = stick {
        let action = profile.get_stick(PadStickTrigger::Stick);
        action.whole(&mut mapper, x, y, PadStickTrigger::Stick);
        action.whole(&mut mapper, 0, 0, PadStickTrigger::Stick);
    }

    let sides = [PadStickTrigger::LTrigger, PadStickTrigger::RTrigger];
    for (what, pos) in sides.into_iter().zip(triggers) {
        if let Some(pos) = pos {
            let action = profile.get_trigger(what);
            action.trigger(&mut mapper, 0, pos, what);
            action.trigger(&mut mapper, pos, 0, what);
        }
    }

    Ok(mapper.take_events())
}
