//! Editing example: build a diagram in code and watch energization follow
//! each edit.

use busbar::prelude::*;

fn report(session: &mut Session, step: &str) {
    let state = session.energization();
    let live: Vec<&str> = state.energized_devices().iter().map(String::as_str).collect();
    println!("{:<28} live: {}", step, live.join(", "));
}

fn main() -> Result<(), BusbarError> {
    let diagram = Diagram::new(
        vec![
            Device::source("UTIL", SignalKind::Ac).with_label("Utility"),
            Device::breaker("MAIN", false).with_label("Main breaker"),
            Device::bus("BUS"),
            Device::rectifier("RECT"),
            Device::load("DC_LOAD"),
        ],
        vec![
            Conductor::new("w1", PinId::new("UTIL", 0), PinId::new("MAIN", 0)),
            Conductor::new("w2", PinId::new("MAIN", 1), PinId::new("BUS", 0)),
            Conductor::new("w3", PinId::new("BUS", 1), PinId::new("RECT", 0)),
        ],
    )?;

    let mut session = Session::new(diagram);
    report(&mut session, "initial");

    session.apply(&Edit::ToggleBreaker("MAIN".into()))?;
    report(&mut session, "close main breaker");

    let dc_feed = Conductor::between(PinId::new("RECT", 1), PinId::new("DC_LOAD", 0));
    let dc_feed_id = dc_feed.id.clone();
    session.apply(&Edit::AddConductor(dc_feed))?;
    report(&mut session, "wire rectifier to load");

    println!(
        "\n{} carries {:?}",
        dc_feed_id,
        session.energization().conductor_signal(&dc_feed_id)
    );
    println!("{}", session.export_json()?);

    Ok(())
}
