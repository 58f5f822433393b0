use crate::base::address::{self, Address, Group, Long, Short, LONG_MASK};
use crate::config::GearConfig;
use crate::drivers::driver::ForwardFrame;
use crate::drivers::frame_latch::{FrameLatch, TickCounter};
use crate::drivers::simulator::sim_driver::{SimBus, SimDriver};
use crate::gear::classify;
use crate::gear::cmd_defs::YES;
use crate::gear::commands::{self, Command};
use crate::gear::commissioning::PhysicalSelection;
use crate::gear::control_gear::ControlGear;
use crate::utils::nv_store::{MemoryStore, NvStore};
use std::sync::Arc;

struct SimGear {
    gear: ControlGear,
    latch: Arc<FrameLatch>,
    ticks: Arc<TickCounter>,
    bus: SimBus,
    seed: u16,
    lamp_failure: bool,
}

impl SimGear {
    fn new(store: Box<dyn NvStore>, seed: u16) -> SimGear {
        let latch = Arc::new(FrameLatch::new());
        let ticks = Arc::new(TickCounter::new());
        let (driver, bus) = SimDriver::new(ticks.clone(), seed);
        let mut gear = ControlGear::new(
            GearConfig::default(),
            Box::new(driver),
            store,
            latch.clone(),
            ticks.clone(),
        );
        gear.poll(false);
        SimGear {
            gear,
            latch,
            ticks,
            bus,
            seed,
            lamp_failure: false,
        }
    }

    fn poll(&mut self) -> u8 {
        self.gear.poll(self.lamp_failure)
    }
}

/// A controller and a number of gear on the same bus
struct TestBus {
    gears: Vec<SimGear>,
}

impl TestBus {
    fn new(n: usize) -> TestBus {
        let gears = (0..n)
            .map(|i| SimGear::new(Box::new(MemoryStore::new()), 0x1234 + i as u16 * 7919))
            .collect();
        TestBus { gears }
    }

    fn gear(&self, i: usize) -> &ControlGear {
        &self.gears[i].gear
    }

    fn gear_mut(&mut self, i: usize) -> &mut ControlGear {
        &mut self.gears[i].gear
    }

    /// Deliver a frame to every gear. Returns all backward frames.
    fn transfer(&mut self, frame: ForwardFrame) -> Vec<u8> {
        let mut answers = Vec::new();
        for g in &mut self.gears {
            g.latch.post(frame);
            g.poll();
            answers.extend(g.bus.take_answers());
        }
        answers
    }

    fn send<const ANSWER: bool, const TWICE: bool>(
        &mut self,
        cmd: Command<ANSWER, TWICE>,
    ) -> Vec<u8> {
        if cmd.send_twice() {
            self.transfer(cmd.frame());
        }
        self.transfer(cmd.frame())
    }

    fn send_once<const ANSWER: bool, const TWICE: bool>(
        &mut self,
        cmd: Command<ANSWER, TWICE>,
    ) -> Vec<u8> {
        self.transfer(cmd.frame())
    }

    /// Send a query expecting at most one answer
    fn query<const TWICE: bool>(&mut self, cmd: Command<true, TWICE>) -> Option<u8> {
        let answers = self.send(cmd);
        assert!(answers.len() <= 1, "Collision: {:?}", answers);
        answers.first().copied()
    }

    /// Let `ms` ticks pass
    fn advance(&mut self, ms: u32) {
        for _ in 0..ms {
            for g in &mut self.gears {
                g.ticks.tick();
                g.poll();
            }
        }
    }

    /// Power cycle gear `i`, keeping its store
    fn restart(&mut self, i: usize) {
        let g = self.gears.remove(i);
        let seed = g.seed;
        let store = g.gear.into_store();
        self.gears.insert(i, SimGear::new(store, seed));
    }

    fn set_dtr(&mut self, value: u8) {
        self.send(commands::DTR(value));
    }

    fn set_search_address(&mut self, long: Long) {
        let [h, m, l] = address::long_bytes(long);
        self.send(commands::SEARCHADDRH(h));
        self.send(commands::SEARCHADDRM(m));
        self.send(commands::SEARCHADDRL(l));
    }

    // Any gear with a random address less than or equal to `long`
    fn any_below(&mut self, long: Long) -> bool {
        self.set_search_address(long);
        !self.send(commands::COMPARE()).is_empty()
    }

    /// Binary search for the lowest random address among gear still
    /// taking part in the search
    fn find_lowest(&mut self) -> Option<Long> {
        if !self.any_below(LONG_MASK) {
            return None;
        }
        let mut low = 0;
        let mut high = LONG_MASK;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.any_below(mid) {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        Some(low)
    }

    /// Give all gear consecutive short addresses, in random address order
    fn commission(&mut self) -> Vec<Long> {
        self.send(commands::INITIALISE_ALL());
        self.send(commands::RANDOMISE());
        let mut found = Vec::new();
        while let Some(long) = self.find_lowest() {
            let short = Short::new(found.len() as u8);
            self.set_search_address(long);
            self.send(commands::PROGRAM_SHORT_ADDRESS(short));
            assert_eq!(self.send(commands::VERIFY_SHORT_ADDRESS(short)), vec![YES]);
            self.send(commands::WITHDRAW());
            found.push(long);
            assert!(found.len() <= self.gears.len(), "Search did not terminate");
        }
        self.send(commands::TERMINATE());
        found
    }
}

#[test]
fn power_up_state() {
    let mut bus = TestBus::new(1);
    assert!(!bus.gear(0).is_running());
    assert_eq!(bus.query(commands::QUERY_STATUS(Address::Broadcast)), Some(0xe4));
    assert!(bus.gear(0).is_running());
    assert_eq!(bus.query(commands::QUERY_ACTUAL_LEVEL(Address::Broadcast)), Some(0xfe));
    assert_eq!(bus.query(commands::QUERY_MIN_LEVEL(Address::Broadcast)), Some(50));
    assert_eq!(bus.query(commands::QUERY_PHYSICAL_MINIMUM(Address::Broadcast)), Some(50));
    assert_eq!(bus.query(commands::QUERY_FADE(Address::Broadcast)), Some(0x07));
    assert_eq!(bus.query(commands::QUERY_CONTROL_GEAR_PRESENT(Address::Broadcast)), Some(YES));
    assert_eq!(bus.query(commands::QUERY_MISSING_SHORT_ADDRESS(Address::Broadcast)), Some(YES));
    assert_eq!(bus.query(commands::QUERY_LIMIT_ERROR(Address::Broadcast)), None);
    assert_eq!(bus.query(commands::QUERY_SCENE_LEVEL(Address::Broadcast, 4)), Some(0xff));
}

#[test]
fn answer_timing() {
    let mut bus = TestBus::new(1);
    assert_eq!(bus.gears[0].bus.slept_ticks(), 0);
    bus.query(commands::QUERY_STATUS(Address::Broadcast));
    assert_eq!(bus.gears[0].bus.slept_ticks(), 13);
    // Silent queries don't block
    bus.query(commands::QUERY_LAMP_FAILURE(Address::Broadcast));
    assert_eq!(bus.gears[0].bus.slept_ticks(), 13);
}

#[test]
fn twice_confirmation() {
    let mut bus = TestBus::new(1);
    bus.set_dtr(100);
    bus.send_once(commands::SET_MAX_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(Address::Broadcast)), Some(0xfe));

    // Another command in between
    bus.send_once(commands::SET_MAX_LEVEL(Address::Broadcast));
    bus.send_once(commands::SET_MIN_LEVEL(Address::Broadcast));
    bus.send_once(commands::SET_MAX_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(Address::Broadcast)), Some(0xfe));
    assert_eq!(bus.query(commands::QUERY_MIN_LEVEL(Address::Broadcast)), Some(50));

    // Too slow
    bus.send_once(commands::SET_MAX_LEVEL(Address::Broadcast));
    bus.advance(100);
    bus.send_once(commands::SET_MAX_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(Address::Broadcast)), Some(0xfe));

    bus.send_once(commands::SET_MAX_LEVEL(Address::Broadcast));
    bus.advance(99);
    bus.send_once(commands::SET_MAX_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(Address::Broadcast)), Some(100));
}

#[test]
fn addressing() {
    let mut bus = TestBus::new(1);
    bus.set_dtr((5 << 1) | 1);
    bus.send(commands::SET_SHORT_ADDRESS(Address::Broadcast));
    bus.send(commands::ADD_TO_GROUP(Address::Broadcast, 3));
    assert_eq!(bus.gear(0).registers().short_address, Some(Short::new(5)));
    assert_eq!(bus.gear(0).registers().group, 0x0008);

    for a in 0..=255u8 {
        if classify::is_special(a) || a & 1 == 0 {
            continue;
        }
        let expected = match a >> 1 {
            5 => true,
            0x43 => true,
            0x7f => true,
            _ => false,
        };
        let answer = bus.query(Command::<true, false>([a, 0xa0]));
        assert_eq!(answer.is_some(), expected, "Address byte {:02x}", a);
    }
    assert_eq!(bus.query(commands::QUERY_ACTUAL_LEVEL(Short::new(5))), Some(0xfe));
    assert_eq!(bus.query(commands::QUERY_ACTUAL_LEVEL(Group::new(3))), Some(0xfe));
    assert_eq!(bus.query(commands::QUERY_ACTUAL_LEVEL(Group::new(4))), None);
}

#[test]
fn status_flags() {
    let mut bus = TestBus::new(1);
    // Queries leave the flags alone
    assert_eq!(bus.query(commands::QUERY_RESET_STATE(Address::Broadcast)), Some(YES));
    assert_eq!(bus.query(commands::QUERY_POWER_FAILURE(Address::Broadcast)), Some(YES));
    // Special commands clear reset state
    bus.set_dtr(0);
    assert_eq!(bus.query(commands::QUERY_STATUS(Address::Broadcast)), Some(0xc4));
    assert_eq!(bus.query(commands::QUERY_RESET_STATE(Address::Broadcast)), None);
    // Arc power commands clear power failure
    bus.send(commands::OFF(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_STATUS(Address::Broadcast)), Some(0x40));
    assert_eq!(bus.query(commands::QUERY_POWER_FAILURE(Address::Broadcast)), None);
    assert_eq!(bus.query(commands::QUERY_LAMP_POWER_ON(Address::Broadcast)), None);
}

#[test]
fn unknown_commands_are_ignored() {
    let mut bus = TestBus::new(1);
    let before = bus.gear(0).registers().clone();
    assert!(bus.send(Command::<true, false>([0xff, 0x9c])).is_empty());
    assert!(bus.send(Command::<true, false>([0xff, 0xd0])).is_empty());
    assert!(bus.send(Command::<true, false>([0xc3, 0x00])).is_empty());
    assert!(bus.send(Command::<false, false>([0xff, 0x0c])).is_empty());
    let after = bus.gear(0).registers();
    assert_eq!(after.actual_level, before.actual_level);
    assert_eq!(after.dtr, before.dtr);
    assert_eq!(after.max_level, before.max_level);
}

#[test]
fn direct_arc_power_mask() {
    let mut bus = TestBus::new(1);
    bus.send(commands::DAPC(Address::Broadcast, 120));
    let regs = bus.gear(0).registers().clone();
    let requested = bus.gear(0).fade().requested_level();
    bus.gear_mut(0).registers_mut().status.reset_state = true;
    bus.gear_mut(0).registers_mut().status.power_failure = true;

    bus.send(commands::DAPC(Address::Broadcast, 0xff));
    assert_eq!(bus.gear(0).registers().actual_level, regs.actual_level);
    assert_eq!(bus.gear(0).fade().requested_level(), requested);
    assert!(!bus.gear(0).registers().status.reset_state);
    assert!(!bus.gear(0).registers().status.power_failure);
}

#[test]
fn no_fade_time_is_immediate() {
    let mut bus = TestBus::new(1);
    bus.send(commands::DAPC(Address::Broadcast, 100));
    assert_eq!(bus.gear(0).registers().actual_level, 100);
    bus.send(commands::DAPC(Address::Broadcast, 200));
    assert_eq!(bus.gear(0).registers().actual_level, 200);
    assert!(!bus.gear(0).registers().status.fade_running);
    assert!(!bus.gear(0).fade().is_fading());
}

#[test]
fn fade_with_fade_time() {
    let mut bus = TestBus::new(1);
    bus.send(commands::DAPC(Address::Broadcast, 100));
    bus.set_dtr(4);
    bus.send(commands::SET_FADE_TIME(Address::Broadcast));
    bus.send(commands::DAPC(Address::Broadcast, 200));
    assert_eq!(bus.gear(0).registers().actual_level, 100);
    bus.advance(1000);
    assert_eq!(bus.gear(0).registers().actual_level, 150);
    let status = bus.query(commands::QUERY_STATUS(Address::Broadcast));
    assert_eq!(status.map(|s| s & 0x10), Some(0x10));
    bus.advance(1100);
    assert_eq!(bus.gear(0).registers().actual_level, 200);
    assert!(!bus.gear(0).registers().status.fade_running);

    // Interrupted by an immediate command
    bus.send(commands::DAPC(Address::Broadcast, 100));
    bus.advance(500);
    bus.send(commands::RECALL_MAX_LEVEL(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().actual_level, 254);
    bus.advance(2000);
    assert_eq!(bus.gear(0).registers().actual_level, 254);
}

#[test]
fn up_and_step_commands() {
    let mut bus = TestBus::new(1);
    bus.send(commands::DAPC(Address::Broadcast, 100));
    bus.send(commands::UP(Address::Broadcast));
    bus.advance(250);
    // Fade rate 7 is 9 steps per 200ms
    assert_eq!(bus.gear(0).registers().actual_level, 109);
    bus.send(commands::STEP_DOWN(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().actual_level, 108);
    bus.send(commands::RECALL_MIN_LEVEL(Address::Broadcast));
    bus.send(commands::STEP_DOWN(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().actual_level, 50);
    bus.send(commands::STEP_DOWN_AND_OFF(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().actual_level, 0);
    // Lamp off, step up does nothing
    bus.send(commands::STEP_UP(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().actual_level, 0);
    bus.send(commands::ON_AND_STEP_UP(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().actual_level, 50);
    bus.send(commands::ON_AND_STEP_UP(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().actual_level, 51);
}

#[test]
fn level_limits() {
    let values = [0u8, 1, 49, 50, 51, 100, 253, 254, 255];
    let mut bus = TestBus::new(1);
    for &a in &values {
        for &b in &values {
            bus.set_dtr(a);
            bus.send(commands::SET_MAX_LEVEL(Address::Broadcast));
            bus.set_dtr(b);
            bus.send(commands::SET_MIN_LEVEL(Address::Broadcast));
            let regs = bus.gear(0).registers();
            assert!(regs.min_level < regs.max_level, "max {} min {}", a, b);

            bus.set_dtr(a);
            bus.send(commands::SET_MIN_LEVEL(Address::Broadcast));
            bus.set_dtr(b);
            bus.send(commands::SET_MAX_LEVEL(Address::Broadcast));
            let regs = bus.gear(0).registers();
            assert!(regs.min_level < regs.max_level, "min {} max {}", a, b);
        }
    }

    // Out of range levels are limited and flagged
    bus.set_dtr(60);
    bus.send(commands::SET_MIN_LEVEL(Address::Broadcast));
    bus.set_dtr(200);
    bus.send(commands::SET_MAX_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_MIN_LEVEL(Address::Broadcast)), Some(60));
    bus.send(commands::DAPC(Address::Broadcast, 220));
    assert_eq!(bus.gear(0).registers().actual_level, 200);
    assert_eq!(bus.query(commands::QUERY_LIMIT_ERROR(Address::Broadcast)), Some(YES));
    bus.send(commands::DAPC(Address::Broadcast, 20));
    assert_eq!(bus.gear(0).registers().actual_level, 60);
    bus.send(commands::DAPC(Address::Broadcast, 100));
    assert_eq!(bus.query(commands::QUERY_LIMIT_ERROR(Address::Broadcast)), None);
}

#[test]
fn min_level_raises_actual_level() {
    let mut bus = TestBus::new(1);
    bus.send(commands::OFF(Address::Broadcast));
    bus.set_dtr(100);
    bus.send(commands::SET_MIN_LEVEL(Address::Broadcast));
    assert_eq!(bus.gear(0).registers().min_level, 100);
    assert_eq!(bus.gear(0).registers().actual_level, 100);
    assert_eq!(bus.query(commands::QUERY_LAMP_POWER_ON(Address::Broadcast)), Some(YES));

    // Lowering it leaves the level alone
    bus.set_dtr(60);
    bus.send(commands::SET_MIN_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_ACTUAL_LEVEL(Address::Broadcast)), Some(100));
}

#[test]
fn inconsistent_store() {
    let store = MemoryStore::from_bytes(&[crate::utils::nv_store::INITIALIZED]);
    let mut bus = TestBus {
        gears: vec![SimGear::new(Box::new(store), 1)],
    };
    assert_eq!(bus.gear(0).registers().min_level, 50);
    assert_eq!(bus.gear(0).registers().max_level, 0xfe);
    assert_eq!(bus.query(commands::QUERY_RESET_STATE(Address::Broadcast)), Some(YES));
    bus.set_dtr(100);
    bus.send(commands::SET_MAX_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(Address::Broadcast)), Some(100));
    assert_eq!(bus.query(commands::QUERY_MIN_LEVEL(Address::Broadcast)), Some(50));
}

#[test]
fn dtr_from_actual_level() {
    let mut bus = TestBus::new(1);
    bus.set_dtr(17);
    assert_eq!(bus.query(commands::QUERY_CONTENT_DTR(Address::Broadcast)), Some(17));
    bus.send(commands::DAPC(Address::Broadcast, 120));
    // Not confirmed
    bus.send_once(commands::STORE_ACTUAL_LEVEL_IN_DTR(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_CONTENT_DTR(Address::Broadcast)), Some(17));
    bus.send(commands::STORE_ACTUAL_LEVEL_IN_DTR(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_CONTENT_DTR(Address::Broadcast)), Some(120));
    bus.send(commands::SET_POWER_ON_LEVEL(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_POWER_ON_LEVEL(Address::Broadcast)), Some(120));
}

#[test]
fn up_while_switching_on() {
    let mut bus = TestBus::new(1);
    bus.send(commands::OFF(Address::Broadcast));
    bus.set_dtr(4);
    bus.send(commands::SET_FADE_TIME(Address::Broadcast));
    bus.send(commands::DAPC(Address::Broadcast, 200));
    assert!(bus.gear(0).registers().status.fade_running);
    // The lamp is still off, so UP only stops the fade
    bus.send(commands::UP(Address::Broadcast));
    bus.advance(5000);
    assert_eq!(bus.gear(0).registers().actual_level, 0);
    assert!(!bus.gear(0).fade().is_fading());
    assert_eq!(bus.query(commands::QUERY_STATUS(Address::Broadcast)), Some(0x40));
}

#[test]
fn fade_rate_zero_rejected() {
    let mut bus = TestBus::new(1);
    bus.set_dtr(0);
    bus.send(commands::SET_FADE_RATE(Address::Broadcast));
    bus.set_dtr(0x13);
    bus.send(commands::SET_FADE_TIME(Address::Broadcast));
    assert_eq!(bus.query(commands::QUERY_FADE(Address::Broadcast)), Some(0x37));
}

#[test]
fn scenes_and_groups() {
    let mut bus = TestBus::new(2);
    bus.set_dtr(80);
    bus.send(commands::SET_SCENE(Address::Broadcast, 5));
    bus.send(commands::ADD_TO_GROUP(Address::Broadcast, 3));
    bus.send(commands::ADD_TO_GROUP(Address::Broadcast, 12));
    assert_eq!(bus.gear(0).registers().group, 0x1008);
    assert_eq!(bus.send(commands::QUERY_GROUPS_8_15(Group::new(12))), vec![0x10, 0x10]);
    bus.send(commands::REMOVE_FROM_GROUP(Address::Broadcast, 12));
    assert_eq!(bus.gear(1).registers().group, 0x0008);

    bus.send(commands::GOTO_SCENE(Group::new(3), 5));
    assert_eq!(bus.gear(0).registers().actual_level, 80);
    assert_eq!(bus.gear(1).registers().actual_level, 80);

    // Not a member of the scene
    bus.send(commands::REMOVE_FROM_SCENE(Address::Broadcast, 5));
    bus.send(commands::DAPC(Address::Broadcast, 90));
    bus.send(commands::GOTO_SCENE(Address::Broadcast, 5));
    assert_eq!(bus.gear(0).registers().actual_level, 90);
}

#[test]
fn settings_survive_restart() {
    let mut bus = TestBus::new(1);
    let settings = [
        (200, commands::SET_MAX_LEVEL(Address::Broadcast)),
        (60, commands::SET_MIN_LEVEL(Address::Broadcast)),
        (70, commands::SET_SYSTEM_FAILURE_LEVEL(Address::Broadcast)),
        (150, commands::SET_POWER_ON_LEVEL(Address::Broadcast)),
        (3, commands::SET_FADE_TIME(Address::Broadcast)),
        (5, commands::SET_FADE_RATE(Address::Broadcast)),
        (120, commands::SET_SCENE(Address::Broadcast, 2)),
        ((7 << 1) | 1, commands::SET_SHORT_ADDRESS(Address::Broadcast)),
    ];
    for (dtr, cmd) in settings {
        bus.set_dtr(dtr);
        bus.send(cmd);
    }
    bus.send(commands::ADD_TO_GROUP(Address::Broadcast, 4));
    // Removals are persisted too
    bus.set_dtr(90);
    bus.send(commands::SET_SCENE(Address::Broadcast, 3));
    bus.send(commands::ADD_TO_GROUP(Address::Broadcast, 9));
    bus.send(commands::REMOVE_FROM_SCENE(Address::Broadcast, 3));
    bus.send(commands::REMOVE_FROM_GROUP(Address::Broadcast, 9));
    bus.send(commands::INITIALISE_ALL());
    bus.send(commands::RANDOMISE());
    let random = bus.gear(0).registers().random_address;
    assert_ne!(random, LONG_MASK);

    bus.restart(0);
    let a = Short::new(7);
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(a)), Some(200));
    assert_eq!(bus.query(commands::QUERY_MIN_LEVEL(a)), Some(60));
    assert_eq!(bus.query(commands::QUERY_SYSTEM_FAILURE_LEVEL(a)), Some(70));
    assert_eq!(bus.query(commands::QUERY_POWER_ON_LEVEL(a)), Some(150));
    assert_eq!(bus.query(commands::QUERY_ACTUAL_LEVEL(a)), Some(150));
    assert_eq!(bus.query(commands::QUERY_FADE(a)), Some(0x35));
    assert_eq!(bus.query(commands::QUERY_SCENE_LEVEL(a, 2)), Some(120));
    assert_eq!(bus.query(commands::QUERY_SCENE_LEVEL(a, 3)), Some(0xff));
    assert_eq!(bus.query(commands::QUERY_GROUPS_0_7(a)), Some(0x10));
    assert_eq!(bus.query(commands::QUERY_GROUPS_8_15(a)), Some(0x00));
    let [h, m, l] = address::long_bytes(random);
    assert_eq!(bus.query(commands::QUERY_RANDOM_ADDRESS_H(a)), Some(h));
    assert_eq!(bus.query(commands::QUERY_RANDOM_ADDRESS_M(a)), Some(m));
    assert_eq!(bus.query(commands::QUERY_RANDOM_ADDRESS_L(a)), Some(l));
    assert_eq!(bus.query(commands::QUERY_MISSING_SHORT_ADDRESS(a)), None);
    assert_eq!(bus.query(commands::QUERY_RESET_STATE(a)), None);
    assert_eq!(bus.query(commands::QUERY_POWER_FAILURE(a)), Some(YES));
}

#[test]
fn reset() {
    let mut bus = TestBus::new(1);
    bus.set_dtr((9 << 1) | 1);
    bus.send(commands::SET_SHORT_ADDRESS(Address::Broadcast));
    bus.set_dtr(100);
    bus.send(commands::SET_MAX_LEVEL(Address::Broadcast));
    bus.send(commands::SET_SCENE(Address::Broadcast, 0));
    bus.send(commands::ADD_TO_GROUP(Address::Broadcast, 1));
    bus.send(commands::OFF(Address::Broadcast));

    bus.send(commands::RESET(Short::new(9)));
    let a = Short::new(9);
    assert_eq!(bus.query(commands::QUERY_RESET_STATE(a)), Some(YES));
    assert_eq!(bus.query(commands::QUERY_POWER_FAILURE(a)), None);
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(a)), Some(0xfe));
    assert_eq!(bus.query(commands::QUERY_SCENE_LEVEL(a, 0)), Some(0xff));
    assert_eq!(bus.query(commands::QUERY_GROUPS_0_7(a)), Some(0x00));
    assert_eq!(bus.query(commands::QUERY_ACTUAL_LEVEL(a)), Some(0xfe));

    // Reset values are what a cold start gives
    bus.restart(0);
    assert_eq!(bus.query(commands::QUERY_MAX_LEVEL(a)), Some(0xfe));
    assert_eq!(bus.query(commands::QUERY_SCENE_LEVEL(a, 0)), Some(0xff));
}

#[test]
fn bus_failure() {
    let mut bus = TestBus::new(1);
    bus.set_dtr(70);
    bus.send(commands::SET_SYSTEM_FAILURE_LEVEL(Address::Broadcast));
    bus.gears[0].bus.set_bus_present(false);
    bus.advance(400);
    assert_eq!(bus.gear(0).registers().actual_level, 0xfe);
    assert!(!bus.gear(0).is_bus_failure());
    bus.advance(200);
    assert!(bus.gear(0).is_bus_failure());
    assert_eq!(bus.gear(0).registers().actual_level, 70);

    // Nothing is received while the bus is down
    let g = &mut bus.gears[0];
    g.latch.post(commands::DAPC(Address::Broadcast, 100).frame());
    g.ticks.tick();
    g.poll();
    assert_eq!(g.gear.registers().actual_level, 70);

    bus.gears[0].bus.set_bus_present(true);
    bus.advance(10);
    assert!(!bus.gear(0).is_bus_failure());
    assert_eq!(bus.gear(0).registers().actual_level, 70);
    bus.send(commands::DAPC(Address::Broadcast, 100));
    assert_eq!(bus.gear(0).registers().actual_level, 100);
}

#[test]
fn bus_failure_without_level() {
    let mut bus = TestBus::new(1);
    bus.set_dtr(0xff);
    bus.send(commands::SET_SYSTEM_FAILURE_LEVEL(Address::Broadcast));
    bus.send(commands::DAPC(Address::Broadcast, 120));
    bus.gears[0].bus.set_bus_present(false);
    bus.advance(1000);
    assert!(bus.gear(0).is_bus_failure());
    assert_eq!(bus.gear(0).registers().actual_level, 120);
}

#[test]
fn compare_example() {
    let mut bus = TestBus::new(1);
    bus.send(commands::INITIALISE_ALL());
    bus.gear_mut(0).registers_mut().random_address = 0x102030;
    bus.set_search_address(0x102030);
    assert_eq!(bus.send(commands::COMPARE()), vec![YES]);
    bus.set_search_address(0x10202f);
    assert!(bus.send(commands::COMPARE()).is_empty());
}

#[test]
fn special_mode_required() {
    let mut bus = TestBus::new(1);
    bus.send(commands::RANDOMISE());
    assert_eq!(bus.gear(0).registers().random_address, LONG_MASK);
    bus.send_once(commands::INITIALISE_ALL());
    assert!(!bus.gear(0).commissioning().is_special_mode());
    bus.send(commands::INITIALISE_ALL());
    assert!(bus.gear(0).commissioning().is_special_mode());
    bus.send(commands::TERMINATE());
    assert!(!bus.gear(0).commissioning().is_special_mode());
    bus.send(commands::RANDOMISE());
    assert_eq!(bus.gear(0).registers().random_address, LONG_MASK);
}

#[test]
fn commission_several() {
    let mut bus = TestBus::new(4);
    let found = bus.commission();
    assert_eq!(found.len(), 4);
    for w in found.windows(2) {
        assert!(w[0] < w[1]);
    }
    for (n, long) in found.iter().enumerate() {
        let short = Short::new(n as u8);
        let [h, m, l] = address::long_bytes(*long);
        assert_eq!(bus.query(commands::QUERY_RANDOM_ADDRESS_H(short)), Some(h));
        assert_eq!(bus.query(commands::QUERY_RANDOM_ADDRESS_M(short)), Some(m));
        assert_eq!(bus.query(commands::QUERY_RANDOM_ADDRESS_L(short)), Some(l));
    }
    for i in 0..4 {
        assert!(!bus.gear(i).commissioning().is_special_mode());
        assert!(!bus.gear(i).registers().status.missing_short_address);
    }

    // Only gear without address take part the second time
    bus.send(commands::INITIALISE_NO_ADDR());
    assert!(!bus.gear(0).commissioning().is_special_mode());
    bus.send(commands::INITIALISE_ADDR(Short::new(2)));
    let selected = (0..4)
        .filter(|&i| bus.gear(i).commissioning().is_special_mode())
        .count();
    assert_eq!(selected, 1);
    assert_eq!(bus.query(commands::QUERY_SHORT_ADDRESS()), None);
}

#[test]
fn physical_selection() {
    let mut bus = TestBus::new(2);
    bus.send(commands::INITIALISE_ALL());
    bus.send(commands::PHYSICAL_SELECTION());
    assert_eq!(
        bus.gear(0).commissioning().physical_selection(),
        PhysicalSelection::Requested
    );
    // Compare is off while selecting physically
    bus.set_search_address(LONG_MASK);
    assert!(bus.send(commands::COMPARE()).is_empty());

    // Remove the lamp of gear 1
    bus.gears[1].lamp_failure = true;
    bus.advance(1);
    assert_eq!(
        bus.gear(1).commissioning().physical_selection(),
        PhysicalSelection::Enabled
    );
    assert_eq!(bus.query(commands::QUERY_LAMP_FAILURE(Address::Broadcast)), Some(YES));
    bus.send(commands::PROGRAM_SHORT_ADDRESS(Short::new(12)));
    assert_eq!(bus.gear(0).registers().short_address, None);
    assert_eq!(bus.gear(1).registers().short_address, Some(Short::new(12)));
    assert_eq!(bus.query(commands::QUERY_SHORT_ADDRESS()), Some((12 << 1) | 1));

    bus.gears[1].lamp_failure = false;
    bus.advance(1);
    assert_eq!(
        bus.gear(1).commissioning().physical_selection(),
        PhysicalSelection::Requested
    );
    bus.send(commands::PHYSICAL_SELECTION());
    assert_eq!(
        bus.gear(1).commissioning().physical_selection(),
        PhysicalSelection::Disabled
    );
    assert!(bus.gear(1).commissioning().is_compare_enabled());
}
