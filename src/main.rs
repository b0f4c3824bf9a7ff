//! Headless demo driver
//!
//! Runs the kernel against a small built-in level with a scripted input
//! feed and prints the outcome. Useful for eyeballing determinism and event
//! output without any presentation layer attached.

use tilerunner::sim::{InputState, Level, LevelMeta};
use tilerunner::{Session, SessionDirective};

const DEMO_LEVEL: &[&str] = &[
    "                                                            ",
    "                                                            ",
    "                                                            ",
    "                                                            ",
    "                                                            ",
    "                                                            ",
    "                                                            ",
    "                                                            ",
    "        ?B?M?                    BB?B                       ",
    "                                                            ",
    "                                              HHH           ",
    "                  []         []              HHHH           ",
    "     g   g        {}    g    {}       g     HHHHH      P    ",
    "############################################################",
    "############################################################",
];

fn main() {
    env_logger::init();

    let level = Level::from_ascii(DEMO_LEVEL, LevelMeta::default());
    let mut session = Session::new(level);

    // Hold right and run, hopping every couple of seconds
    let mut directive = SessionDirective::Continue;
    let mut ticks = 0u32;
    while directive == SessionDirective::Continue && ticks < 60 * 120 {
        let input = InputState {
            right: true,
            run: true,
            jump: (ticks / 30) % 4 == 0,
            ..Default::default()
        };
        directive = session.tick(&input);
        for event in &session.events {
            log::info!("tick {ticks}: {event:?}");
        }
        ticks += 1;
    }

    println!("ran {ticks} ticks -> {directive:?}");
    println!(
        "score {} coins {} lives {} player at ({:.1}, {:.1}) camera {:.1}",
        session.score,
        session.coins,
        session.lives,
        session.player.pos.x,
        session.player.pos.y,
        session.level.camera,
    );
}
