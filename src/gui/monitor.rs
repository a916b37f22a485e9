use std::io::{self, Stdout};

use crate::bus_source::BusSource;
use crate::gui::error::GuiError;
use crate::scene::{IndicatorColor, SceneEngine, Side};
use crate::scene_mirror::SceneMirror;
use crate::session::Session;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame, Terminal,
};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Runs `session` against `source` with a live view of the scene in the
/// terminal, read from the engine's [`SceneMirror`]. Quits when the source
/// ends or the operator presses `q`. Returns the number of frames run.
pub fn monitor<E, S>(
    session: &mut Session<E>,
    source: &mut S,
) -> Result<u64, GuiError>
where
    E: SceneEngine + AsRef<SceneMirror>,
    S: BusSource + ?Sized,
{
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let res = monitor_loop(session, source);

    // restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    res
}

fn monitor_loop<E, S>(
    session: &mut Session<E>,
    source: &mut S,
) -> Result<u64, GuiError>
where
    E: SceneEngine + AsRef<SceneMirror>,
    S: BusSource + ?Sized,
{
    let mut terminal: Term = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    // The frame loop owns the control flow, so terminal errors are parked
    // here and stop the session on the next check
    let mut failure: Option<io::Error> = None;
    let frames = session.run(source, |s| match draw_and_poll(&mut terminal, s) {
        Ok(quit) => quit,
        Err(e) => {
            failure = Some(e);
            true
        }
    })?;

    terminal.show_cursor()?;
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(frames),
    }
}

fn draw_and_poll<E>(terminal: &mut Term, session: &Session<E>) -> io::Result<bool>
where
    E: SceneEngine + AsRef<SceneMirror>,
{
    terminal.draw(|f| ui(f, session, session.engine().as_ref()))?;

    if event::poll(std::time::Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(matches!(key.code, KeyCode::Char('q') | KeyCode::Esc));
            }
        }
    }
    Ok(false)
}

fn indicator_color(color: IndicatorColor) -> Color {
    match color {
        IndicatorColor::Default => Color::White,
        IndicatorColor::Success => Color::Green,
        IndicatorColor::Failure => Color::Red,
        IndicatorColor::Warning => Color::Yellow,
    }
}

fn gauge<'a>(title: String, value: f32, color: Color) -> Gauge<'a> {
    Gauge::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(value.clamp(0.0, 1.0) as f64)
        .label(format!("{:.3}", value))
}

fn side_panel<E: SceneEngine>(
    f: &mut Frame,
    area: Rect,
    session: &Session<E>,
    scene: &SceneMirror,
    side: Side,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let state = session.state();
    let (target, current) = match side {
        Side::Left => (state.target_left, state.current_left),
        Side::Right => (state.target_right, state.current_right),
    };
    let lift = scene.position(side).y - session.config().layout.baseline_y;

    f.render_widget(gauge(format!(" {:?} target ", side), target, Color::DarkGray), rows[0]);
    f.render_widget(gauge(format!(" {:?} current ", side), current, Color::Cyan), rows[1]);
    f.render_widget(
        gauge(
            format!(" {:?} sharpness ", side),
            scene.sharpness(side),
            Color::Magenta,
        ),
        rows[2],
    );
    f.render_widget(
        gauge(format!(" {:?} volume ", side), scene.volume(side), Color::Blue),
        rows[3],
    );
    f.render_widget(
        Paragraph::new(format!(" position {}  lift {:+.3}", scene.position(side), lift)),
        rows[4],
    );
}

fn ui<E: SceneEngine>(f: &mut Frame, session: &Session<E>, scene: &SceneMirror) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(13)])
        .split(f.size());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let state = session.state();
    let onoff = |b: bool| if b { "on" } else { "off" };
    let scene_name = scene
        .scene()
        .map(|p| p.scene_name())
        .unwrap_or("none");
    let status = vec![
        Line::from(format!(
            "scene {}   paradigm {}   frame {}   {:.1}s",
            scene_name,
            session.config().paradigm,
            scene.frames(),
            scene.elapsed()
        )),
        Line::from(format!(
            "fixation {}   centre {}   feedback {}",
            onoff(scene.fixation_visible()),
            onoff(scene.center_visible()),
            onoff(state.in_feedback_period)
        )),
        Line::from(vec![
            "indicator ".into(),
            Span::styled(
                format!("{:?}", scene.indicator()),
                Style::default().fg(indicator_color(scene.indicator())),
            ),
        ]),
        Line::from(format!(
            "cues {}",
            scene
                .cues()
                .iter()
                .rev()
                .take(5)
                .map(|c| format!("{:?}", c))
                .collect::<Vec<_>>()
                .join(" ")
        )),
    ];
    let status = Paragraph::new(status).block(
        Block::default()
            .title(" BCI feedback (q to quit) ".magenta().bold())
            .borders(Borders::ALL),
    );
    f.render_widget(status, rows[0]);

    side_panel(f, columns[0], session, scene, Side::Left);
    side_panel(f, columns[1], session, scene, Side::Right);
}
