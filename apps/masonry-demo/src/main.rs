mod feed;
mod scenes;

fn main() {
    #[cfg(feature = "logging")]
    let _ = env_logger::try_init();

    match scenes::run_masonry_scene() {
        Ok(report) => println!("{report}"),
        Err(err) => {
            eprintln!("masonry scene failed: {err}");
            std::process::exit(1);
        }
    }
    println!("{}", scenes::run_grid_scene());
}
