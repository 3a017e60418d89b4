//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{
    load_configuration,
    configure_logging,
    create_colour_manager,
    build_scan_request,
    build_engine_config,
    pause_requested,
};
pub use execution::{
    prepare_output_dir,
    print_settings,
    run_scan,
    wait_for_interrupt,
    ScanStage,
};
