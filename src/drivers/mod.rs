pub mod driver;
pub mod frame_latch;

pub mod host {
    pub mod host_driver;
}

#[cfg(feature = "simulator")]
pub mod simulator {
    pub mod sim_driver;
}
