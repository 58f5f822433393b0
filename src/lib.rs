pub mod base {
    pub mod address;
    pub mod status;
}

pub mod defs {
    pub mod gear {
        pub mod status;
    }
}

pub mod gear {
    pub mod classify;
    pub mod cmd_defs;
    pub mod command_table;
    pub mod commands;
    pub mod commissioning;
    pub mod control_gear;
    pub mod fade;
    pub mod registers;
    pub mod supervisor;
    pub mod timing;

    mod arc_power;
    mod queries;
    mod settings;
    mod special;

    #[cfg(all(test, feature = "simulator"))]
    mod test;
}

pub mod drivers;

pub mod utils {
    pub mod nv_store;
}

pub mod config;
pub mod error;
