use beat_trainer::chords::params::{PARAM_BPM, PARAM_CHORDS, PARAM_NOTES, PARAM_TENSIONS};
use beat_trainer::messaging::{CommandConsumer, CommandProducer};
use beat_trainer::storage::{load_chord_settings, save_theme};
use beat_trainer::{
    AppConfig, ChordPlayParams, ChordSelector, ChordSlots, ChordTrainer, ChordsPreset, ClockEvent,
    Command, FeedbackSink, KeyValueStore, Metronome, MetronomePreset, PresetLibrary,
    RealtimeScheduler, SilentFeedback, TempoMarking, ThemeMode, create_command_channel,
    open_click_output,
};
use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use ringbuf::traits::{Consumer, Producer};
use std::cell::Cell;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

// Typed commands arrive far slower than the driver drains them
const COMMAND_RINGBUFFER_CAPACITY: usize = 64;

/// How long the driver sleeps on the clock before polling commands again
const DRIVER_POLL_INTERVAL: Duration = Duration::from_millis(10);

const CLICK_VOLUME: f32 = 0.8;

/// Metronome and random chord practice
#[derive(Parser, Debug)]
#[command(name = "beat_trainer", version)]
#[command(about = "Metronome and random chord practice")]
struct Args {
    /// Directory holding presets and settings (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable click sounds
    #[arg(long, global = true)]
    mute: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run the metronome
    Metronome {
        #[arg(long)]
        bpm: Option<i32>,

        /// Beats per bar (1-16)
        #[arg(long)]
        beats: Option<i32>,

        /// Clicks per beat (1-16)
        #[arg(long)]
        subdivisions: Option<i32>,

        /// Load a saved preset by id or name
        #[arg(long)]
        preset: Option<String>,
    },

    /// Practice random chords over a 4/4 click
    Chords {
        #[arg(long)]
        bpm: Option<i32>,

        /// Root notes, e.g. C,Db,F#
        #[arg(long, value_delimiter = ',')]
        notes: Vec<String>,

        /// Chord qualities, e.g. M7,m7,7
        #[arg(long, value_delimiter = ',')]
        chords: Vec<String>,

        /// Tensions, e.g. 9,#11,13
        #[arg(long, value_delimiter = ',')]
        tensions: Vec<String>,

        /// Load a saved chord preset by id or name
        #[arg(long)]
        preset: Option<String>,

        /// Seed for a reproducible chord sequence
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Manage saved presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },

    /// Show or change the colour theme
    Theme {
        /// light, dark or auto
        mode: Option<ThemeMode>,
    },
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    /// List metronome and chord presets, newest first
    List,

    /// Save a metronome preset
    SaveMetronome {
        name: String,

        #[arg(long)]
        bpm: Option<i32>,

        #[arg(long)]
        beats: Option<i32>,

        #[arg(long)]
        subdivisions: Option<i32>,

        /// Tempo marking name, e.g. Andante
        #[arg(long)]
        marking: Option<String>,
    },

    /// Save the last used chord settings as a preset
    SaveChords { name: String },

    /// Delete a preset by id
    Delete { id: String },
}

/// How long the input thread waits before retrying a push into a full queue
const QUEUE_RETRY_INTERVAL: Duration = Duration::from_millis(5);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = AppConfig::resolve(args.data_dir.clone());
    config.sound_enabled = !args.mute;

    let mut store = config.store();
    config.load_theme(&store);
    log::debug!("Using data directory {}", config.data_dir.display());

    match args.mode {
        Mode::Metronome {
            bpm,
            beats,
            subdivisions,
            preset,
        } => run_metronome(&config, &store, bpm, beats, subdivisions, preset),
        Mode::Chords {
            bpm,
            notes,
            chords,
            tensions,
            preset,
            seed,
        } => {
            let overrides = ChordOverrides {
                bpm,
                notes,
                chords,
                tensions,
            };
            run_chords(&config, &mut store, overrides, preset, seed)
        }
        Mode::Presets { action } => run_presets(&mut store, action),
        Mode::Theme { mode } => run_theme(&mut config, &mut store, mode),
    }
}

/// Click output, falling back to silence when no device can be opened
fn open_feedback(
    config: &AppConfig,
) -> (Option<beat_trainer::ClickEngine>, Box<dyn FeedbackSink>) {
    let silent: Box<dyn FeedbackSink> = Box::new(SilentFeedback);
    if !config.sound_enabled {
        return (None, silent);
    }

    match open_click_output(CLICK_VOLUME, config.sound_enabled, config.haptics_enabled) {
        Ok((engine, feedback)) => {
            log::info!(
                "Click output running at {} Hz, {} channels",
                engine.sample_rate(),
                engine.channels()
            );
            let feedback: Box<dyn FeedbackSink> = Box::new(feedback);
            (Some(engine), feedback)
        }
        Err(e) => {
            log::warn!("Audio unavailable, running silent: {}", e);
            (None, silent)
        }
    }
}

/// Read typed commands from stdin on a background thread
fn spawn_input_thread(mut commands: CommandProducer) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match line.parse::<Command>() {
                Ok(command) => {
                    if commands.try_push(command).is_err() {
                        log::warn!("Command queue full, dropping {:?}", command);
                    }
                    if command == Command::Quit {
                        return;
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        // stdin closed; the driver only exits on Quit
        log::debug!("Input closed, sending quit");
        push_until_accepted(&mut commands, Command::Quit);
    });
}

/// Push a command that must not be lost, waiting for the driver to make room
fn push_until_accepted(commands: &mut CommandProducer, command: Command) {
    let mut warned = false;
    while commands.try_push(command).is_err() {
        if !warned {
            log::warn!("Command queue full, waiting to send {:?}", command);
            warned = true;
        }
        std::thread::sleep(QUEUE_RETRY_INTERVAL);
    }
}

fn print_controls() {
    println!(
        "Controls: <enter> start/stop, + / - (++ / --) tempo, bpm N, beats N, subs N, m marking, q quit"
    );
}

fn beat_indicator(beat_index: u8, beats_per_bar: u8) -> String {
    (0..beats_per_bar)
        .map(|i| if i == beat_index { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn find_preset<'a, P>(library: &'a PresetLibrary<P>, key: &str) -> Option<&'a P>
where
    P: beat_trainer::storage::Preset,
{
    library
        .get(key)
        .or_else(|| library.presets().iter().find(|p| p.name() == key))
}

fn run_metronome(
    config: &AppConfig,
    store: &dyn KeyValueStore,
    bpm: Option<i32>,
    beats: Option<i32>,
    subdivisions: Option<i32>,
    preset: Option<String>,
) -> anyhow::Result<()> {
    let (_engine, feedback) = open_feedback(config);
    let mut metronome = Metronome::new(RealtimeScheduler::new()).with_feedback(feedback);

    if let Some(key) = preset {
        let library = PresetLibrary::<MetronomePreset>::load(store);
        let preset = find_preset(&library, &key)
            .ok_or_else(|| anyhow!("No metronome preset '{}'", key))?;
        metronome.apply_preset(preset);
    }
    if let Some(bpm) = bpm {
        metronome.set_bpm(bpm);
    }
    if let Some(beats) = beats {
        metronome.set_beats_per_bar(beats);
    }
    if let Some(subdivisions) = subdivisions {
        metronome.set_subdivisions(subdivisions);
    }

    let indicator_beats = Rc::new(Cell::new(metronome.config().beats_per_bar()));
    metronome.subscribe(Box::new(move |event| match event {
        ClockEvent::Started(config) => {
            indicator_beats.set(config.beats_per_bar());
            println!("\n{}", config);
        }
        ClockEvent::Beat(tick) => {
            print!("\r{}   ", beat_indicator(tick.beat_index, indicator_beats.get()));
            let _ = std::io::stdout().flush();
        }
        ClockEvent::Stopped => println!("\nStopped"),
        ClockEvent::Subdivision(_) => {}
    }));

    println!(
        "Metronome: {} ({})",
        metronome.config(),
        metronome.marking()
    );
    print_controls();

    let (command_tx, mut command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    spawn_input_thread(command_tx);

    loop {
        if !drain_commands(&mut command_rx, |command| {
            let keep_running = metronome.handle(command);
            if command == Command::NextTempoMarking {
                println!("\nTempo: {}", metronome.marking());
            }
            keep_running
        }) {
            return Ok(());
        }

        let deadline = metronome.now() + DRIVER_POLL_INTERVAL;
        metronome.run_until(deadline);
    }
}

/// Apply every pending command. Returns `false` when a command asked to quit.
fn drain_commands<F>(commands: &mut CommandConsumer, mut apply: F) -> bool
where
    F: FnMut(Command) -> bool,
{
    while let Some(command) = commands.try_pop() {
        if !apply(command) {
            return false;
        }
    }
    true
}

/// Chord configuration given on the command line
struct ChordOverrides {
    bpm: Option<i32>,
    notes: Vec<String>,
    chords: Vec<String>,
    tensions: Vec<String>,
}

fn run_chords(
    config: &AppConfig,
    store: &mut dyn KeyValueStore,
    overrides: ChordOverrides,
    preset: Option<String>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut settings = load_chord_settings(store);

    if let Some(key) = preset {
        let library = PresetLibrary::<ChordsPreset>::load(store);
        let preset =
            find_preset(&library, &key).ok_or_else(|| anyhow!("No chord preset '{}'", key))?;
        settings.bpm = preset.bpm;
        settings.set_selection(preset.selection());
    }

    // Command line values go through the same parser as the play-screen parameters
    let mut params: Vec<(&str, String)> = Vec::new();
    if let Some(bpm) = overrides.bpm {
        params.push((PARAM_BPM, bpm.to_string()));
    }
    if !overrides.notes.is_empty() {
        params.push((PARAM_NOTES, overrides.notes.join(",")));
    }
    if !overrides.chords.is_empty() {
        params.push((PARAM_CHORDS, overrides.chords.join(",")));
    }
    if !overrides.tensions.is_empty() {
        params.push((PARAM_TENSIONS, overrides.tensions.join(",")));
    }
    if !params.is_empty() {
        let parsed = ChordPlayParams::from_params(params.iter().map(|(k, v)| (*k, v.as_str())));
        if overrides.bpm.is_some() {
            settings.bpm = parsed.bpm;
        }
        if !overrides.notes.is_empty() {
            settings.notes = parsed.selection.notes;
        }
        if !overrides.chords.is_empty() {
            settings.chords = parsed.selection.chords;
        }
        if !overrides.tensions.is_empty() {
            settings.tensions = parsed.selection.tensions;
        }
    }

    let params = settings
        .start_play(store)
        .context("Select at least one note and one chord quality")?;

    let selector = match seed {
        Some(seed) => ChordSelector::seeded(seed),
        None => ChordSelector::from_entropy(),
    };

    let (_engine, feedback) = open_feedback(config);
    let mut trainer = ChordTrainer::new(RealtimeScheduler::new(), params, selector).with_feedback(feedback);
    trainer.subscribe(Box::new(|event| {
        if let ClockEvent::Beat(tick) = event {
            print!("\r{}", beat_indicator(tick.beat_index, 4));
            let _ = std::io::stdout().flush();
        }
    }));

    println!("Chords at {} BPM", trainer.bpm());
    print_controls();
    let mut shown = trainer.slots();
    print_slots(shown.as_ref());

    let (command_tx, mut command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    spawn_input_thread(command_tx);

    loop {
        if !drain_commands(&mut command_rx, |command| trainer.handle(command)) {
            return Ok(());
        }

        let deadline = trainer.now() + DRIVER_POLL_INTERVAL;
        trainer.run_until(deadline);

        let slots = trainer.slots();
        if slots != shown {
            print_slots(slots.as_ref());
            shown = slots;
        }
    }
}

fn print_slots(slots: Option<&ChordSlots>) {
    match slots {
        Some(slots) => println!("\n  Now: {:<16} Next: {}", slots.current.to_string(), slots.upcoming),
        None => println!("\n  No chord available for this selection"),
    }
}

fn run_presets(store: &mut dyn KeyValueStore, action: PresetAction) -> anyhow::Result<()> {
    let mut metronome_presets = PresetLibrary::<MetronomePreset>::load(store);
    let mut chord_presets = PresetLibrary::<ChordsPreset>::load(store);

    match action {
        PresetAction::List => {
            println!("Metronome presets:");
            for preset in metronome_presets.presets() {
                println!(
                    "  {}  {:<20} {} BPM, {}/{}, {}",
                    preset.id,
                    preset.name,
                    preset.bpm,
                    preset.beat_per_bar,
                    preset.click_per_beat,
                    preset.tempo_name
                );
            }
            println!("Chord presets:");
            for preset in chord_presets.presets() {
                let notes: Vec<String> = preset.notes.iter().map(|n| n.to_string()).collect();
                let chords: Vec<&str> = preset.chords.iter().map(|c| c.symbol()).collect();
                println!(
                    "  {}  {:<20} {} BPM, notes {}, chords {}",
                    preset.id,
                    preset.name,
                    preset.bpm,
                    notes.join(","),
                    chords.join(",")
                );
            }
        }
        PresetAction::SaveMetronome {
            name,
            bpm,
            beats,
            subdivisions,
            marking,
        } => {
            let mut metronome = Metronome::new(beat_trainer::VirtualScheduler::new());
            if let Some(name) = marking {
                let marking = TempoMarking::find(&name)
                    .ok_or_else(|| anyhow!("Unknown tempo marking '{}'", name))?;
                metronome.select_marking(marking);
            }
            if let Some(bpm) = bpm {
                metronome.set_bpm(bpm);
            }
            if let Some(beats) = beats {
                metronome.set_beats_per_bar(beats);
            }
            if let Some(subdivisions) = subdivisions {
                metronome.set_subdivisions(subdivisions);
            }

            let preset = metronome.snapshot(&name)?;
            let id = preset.id.clone();
            metronome_presets
                .try_save(store, preset)
                .context("Failed to save metronome preset")?;
            println!("Saved metronome preset {}", id);
        }
        PresetAction::SaveChords { name } => {
            let settings = load_chord_settings(store);
            let preset = ChordsPreset::new(&name, &settings.play_params())?;
            let id = preset.id.clone();
            chord_presets
                .try_save(store, preset)
                .context("Failed to save chord preset")?;
            println!("Saved chord preset {}", id);
        }
        PresetAction::Delete { id } => {
            let deleted = metronome_presets
                .try_delete(store, &id)
                .context("Failed to delete metronome preset")?
                || chord_presets
                    .try_delete(store, &id)
                    .context("Failed to delete chord preset")?;
            if !deleted {
                bail!("No preset with id '{}'", id);
            }
            println!("Deleted preset {}", id);
        }
    }
    Ok(())
}

fn run_theme(
    config: &mut AppConfig,
    store: &mut dyn KeyValueStore,
    mode: Option<ThemeMode>,
) -> anyhow::Result<()> {
    if let Some(mode) = mode {
        save_theme(store, mode).context("Failed to save theme")?;
        config.theme = mode;
    }
    println!("Theme: {}", config.theme);
    Ok(())
}
