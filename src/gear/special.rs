use super::command_table::GearCommand;
use super::control_gear::ControlGear;

impl ControlGear {
    /// Special commands, mostly for address assignment
    pub(super) fn special(&mut self, command: GearCommand) -> Option<u8> {
        let regs = &mut self.regs;
        let comm = &mut self.commissioning;
        match command {
            GearCommand::Terminate => comm.terminate(),
            GearCommand::Dtr(data) => regs.dtr = data,
            GearCommand::Initialise(data) => comm.initialise(regs, data),
            GearCommand::Randomise => {
                let seed = self.driver.timer_sample();
                comm.randomise(regs, self.store.as_mut(), seed)
            }
            GearCommand::Compare => return comm.compare(regs),
            GearCommand::Withdraw => comm.withdraw(regs),
            GearCommand::SearchAddressH(data) => comm.set_search_address(regs, 16, data),
            GearCommand::SearchAddressM(data) => comm.set_search_address(regs, 8, data),
            GearCommand::SearchAddressL(data) => comm.set_search_address(regs, 0, data),
            GearCommand::ProgramShortAddress(data) => {
                comm.program_short_address(regs, self.store.as_mut(), data)
            }
            GearCommand::VerifyShortAddress(data) => return comm.verify_short_address(regs, data),
            GearCommand::QueryShortAddress => return comm.query_short_address(regs),
            GearCommand::PhysicalSelection => comm.physical_selection_toggle(),
            // Only device type 0 is supported
            GearCommand::EnableDeviceType(_) => {}
            _ => {}
        }
        None
    }
}
