use dali::config::GearConfig;
use dali::drivers::driver::ForwardFrame;
use dali::drivers::frame_latch::{FrameLatch, TickCounter};
use dali::drivers::host::host_driver::HostDriver;
use dali::gear::control_gear::ControlGear;
use dali::gear::timing::TICK;
use dali::utils::nv_store::{FileStore, MemoryStore, NvStore};
use dali_gear as dali;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

extern crate clap;
use clap::{value_parser, Arg, Command};

// Time to wait for answers after the last frame
const DRAIN_TIME: Duration = Duration::from_millis(200);

/// Parse a forward frame written as four hex digits, whitespace ignored
fn parse_frame(line: &str) -> Option<ForwardFrame> {
    let mut bits = 0u32;
    let mut len = 0;
    for c in line.chars() {
        if c.is_whitespace() {
            continue;
        }
        bits = (bits << 4) | c.to_digit(16)?;
        len += 4;
    }
    if len == 16 {
        Some(ForwardFrame::from_bits(bits as u16))
    } else {
        None
    }
}

// Lines like "lamp-failure on" or "bus off"
fn parse_switch(line: &str) -> Option<(&str, bool)> {
    let mut words = line.split_whitespace();
    let name = words.next()?;
    let on = match words.next()? {
        "on" => true,
        "off" => false,
        _ => return None,
    };
    Some((name, on))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let matches = Command::new("dali_gear")
        .about(
            "Run a DALI control gear. Forward frames are read from stdin as \
             hex (\"a3 10\"), \"bus on|off\" and \"lamp-failure on|off\" \
             control the inputs.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("JSON file with gear properties"),
        )
        .arg(
            Arg::new("store")
                .short('s')
                .long("store")
                .help("File used as non-volatile memory"),
        )
        .arg(
            Arg::new("lamp_failure")
                .long("lamp-failure")
                .value_parser(value_parser!(bool))
                .action(clap::ArgAction::SetTrue)
                .help("Start with the lamp failure input active"),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => match GearConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to read configuration from {}: {}", path, e);
                return;
            }
        },
        None => GearConfig::default(),
    };
    let store: Box<dyn NvStore> = match matches.get_one::<String>("store") {
        Some(path) => match FileStore::open(path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                eprintln!("Failed to open store {}: {}", path, e);
                return;
            }
        },
        None => Box::new(MemoryStore::new()),
    };
    let lamp_failure = Arc::new(AtomicBool::new(
        matches.get_one::<bool>("lamp_failure").copied().unwrap_or(false),
    ));
    let bus_present = Arc::new(AtomicBool::new(true));
    let latch = Arc::new(FrameLatch::new());
    let ticks = Arc::new(TickCounter::new());
    let (driver, mut answers) = HostDriver::new(bus_present.clone());
    let mut gear = ControlGear::new(
        config,
        Box::new(driver),
        store,
        latch.clone(),
        ticks.clone(),
    );

    // Tick interrupt
    let tick_source = ticks.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        loop {
            interval.tick().await;
            tick_source.tick();
        }
    });

    // Main loop
    let stop = Arc::new(AtomicBool::new(false));
    let main_loop = {
        let stop = stop.clone();
        let lamp_failure = lamp_failure.clone();
        tokio::task::spawn_blocking(move || {
            let mut last_level = None;
            while !stop.load(Ordering::Acquire) {
                let level = gear.poll(lamp_failure.load(Ordering::Acquire));
                if last_level != Some(level) {
                    println!("Level: {}", level);
                    last_level = Some(level);
                }
                std::thread::sleep(TICK);
            }
        })
    };

    // Receive interrupt
    let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());
    loop {
        tokio::select! {
            line = lines.next() => {
                let line = match line {
                    Some(Ok(line)) => line,
                    Some(Err(e)) => {
                        eprintln!("Failed to read input: {}", e);
                        break;
                    }
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(frame) = parse_frame(&line) {
                    latch.post(frame);
                } else {
                    match parse_switch(&line) {
                        Some(("bus", on)) => bus_present.store(on, Ordering::Release),
                        Some(("lamp-failure", on)) => lamp_failure.store(on, Ordering::Release),
                        _ => eprintln!("Invalid input: {}", line),
                    }
                }
            }
            Some(answer) = answers.recv() => {
                println!("Answer: {:02x}", answer);
            }
        }
    }

    let drain = tokio::time::sleep(DRAIN_TIME);
    tokio::pin!(drain);
    loop {
        tokio::select! {
            _ = &mut drain => break,
            Some(answer) = answers.recv() => println!("Answer: {:02x}", answer),
        }
    }
    stop.store(true, Ordering::Release);
    if let Err(e) = main_loop.await {
        eprintln!("Main loop failed: {}", e);
    }
}

#[test]
fn frame_parsing() {
    assert_eq!(parse_frame("a3 10"), Some(ForwardFrame::new(0xa3, 0x10)));
    assert_eq!(parse_frame("ff90"), Some(ForwardFrame::new(0xff, 0x90)));
    assert_eq!(parse_frame("ff 9"), None);
    assert_eq!(parse_frame("bus off"), None);
    assert_eq!(parse_switch("bus off"), Some(("bus", false)));
    assert_eq!(parse_switch("lamp-failure on"), Some(("lamp-failure", true)));
}
