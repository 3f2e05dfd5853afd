use crate::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Points, Rectangle},
        Block, Paragraph,
    },
    Frame,
};
use snoot::game::GameState;
use snoot::snapshot::Snapshot;
use snoot::targets::TargetState;
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

const TRAIL_LEFT_COLOR: Color = Color::Blue;
const TRAIL_RIGHT_COLOR: Color = Color::Green;

pub fn ui(f: &mut Frame, app: &mut App) {
    let now = Instant::now();
    let snapshot = app.game.snapshot(now);
    let config = *app.game.config();
    let (w, h) = (config.width, config.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(2)].as_ref())
        .split(f.area());

    let block = Block::bordered().title("snoot");
    let inner = block.inner(chunks[0]);
    app.canvas_area = Some(inner);
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    // Canvas-units width of one terminal cell, for centering printed text
    let cell_w = w / inner.width as f64;

    let left_trail: Vec<(f64, f64)> = snapshot
        .left_trail
        .iter()
        .map(|p| (w - p.x, h - p.y))
        .collect();
    let right_trail: Vec<(f64, f64)> = snapshot
        .right_trail
        .iter()
        .map(|p| (w - p.x, h - p.y))
        .collect();

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(|ctx| {
            match snapshot.state {
                GameState::MainMenu => {
                    print_centered(
                        ctx,
                        w / 2.0,
                        h - (h / 2.0 - 80.0),
                        "Choose a game mode".to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                        cell_w,
                    );
                    draw_menu(ctx, &snapshot, h, cell_w);
                }
                GameState::Playing => {
                    draw_targets(ctx, &snapshot, h, cell_w, config.radius);
                    ctx.draw(&Points {
                        coords: &left_trail,
                        color: TRAIL_LEFT_COLOR,
                    });
                    ctx.draw(&Points {
                        coords: &right_trail,
                        color: TRAIL_RIGHT_COLOR,
                    });
                }
                GameState::Paused => {
                    print_centered(
                        ctx,
                        w / 2.0,
                        h - (h / 2.0 - 100.0),
                        "Paused".to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                        cell_w,
                    );
                    draw_menu(ctx, &snapshot, h, cell_w);
                }
                GameState::Finished => {
                    let message = match snapshot.mode {
                        _ if snapshot.success => "You spelled the whole word!",
                        Some(snoot::session::Mode::Speed) => "Time ran out",
                        _ => "Game over",
                    };
                    print_centered(
                        ctx,
                        w / 2.0,
                        h - (h / 2.0 - 100.0),
                        message.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                        cell_w,
                    );
                    print_centered(
                        ctx,
                        w / 2.0,
                        h - (h / 2.0 - 70.0),
                        format!("score {}", snapshot.score),
                        Style::default(),
                        cell_w,
                    );
                    draw_menu(ctx, &snapshot, h, cell_w);
                }
            }

            // Nose cursor, drawn over everything
            ctx.draw(&Circle {
                x: snapshot.cursor.x,
                y: h - snapshot.cursor.y,
                radius: 8.0,
                color: Color::Red,
            });
            if !snapshot.face_visible {
                ctx.print(
                    10.0,
                    h - 14.0,
                    Line::from(Span::styled(
                        "NO FACE",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM),
                    )),
                );
            }
        });
    f.render_widget(canvas, chunks[0]);

    f.render_widget(status_line(&snapshot), chunks[1]);
}

fn draw_targets(ctx: &mut Context, snapshot: &Snapshot, h: f64, cell_w: f64, radius: f64) {
    for target in &snapshot.targets {
        let color = match target.state {
            TargetState::Correct => Color::Green,
            TargetState::Wrong => Color::Red,
            TargetState::Pending if target.dwell_progress > 0.0 => Color::Yellow,
            TargetState::Pending => Color::White,
        };
        ctx.draw(&Circle {
            x: target.pos.x,
            y: h - target.pos.y,
            radius,
            color,
        });
        print_centered(
            ctx,
            target.pos.x,
            h - target.pos.y,
            target.letter.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
            cell_w,
        );
    }
}

fn draw_menu(ctx: &mut Context, snapshot: &Snapshot, h: f64, cell_w: f64) {
    for item in &snapshot.menu {
        let color = if item.hovered {
            Color::Yellow
        } else {
            Color::White
        };
        ctx.draw(&Rectangle {
            x: item.bounds.x,
            y: h - (item.bounds.y + item.bounds.h),
            width: item.bounds.w,
            height: item.bounds.h,
            color,
        });
        let center = item.bounds.center();
        let label = if item.hovered && item.dwell_progress < 1.0 {
            format!("{} {:>2.0}%", item.label, item.dwell_progress * 100.0)
        } else {
            item.label.clone()
        };
        print_centered(
            ctx,
            center.x,
            h - center.y,
            label,
            Style::default().fg(color),
            cell_w,
        );
    }
}

/// Print `text` centered on `x` (both in canvas units, y already flipped).
fn print_centered(ctx: &mut Context, x: f64, y: f64, text: String, style: Style, cell_w: f64) {
    let offset = text.width() as f64 * cell_w / 2.0;
    ctx.print(x - offset, y, Line::from(Span::styled(text, style)));
}

fn status_line(snapshot: &Snapshot) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut spans: Vec<Span> = Vec::new();
    match snapshot.state {
        GameState::Playing => {
            for i in 0..snapshot.word_len {
                match snapshot.collected.get(i) {
                    Some(c) => spans.push(Span::styled(
                        format!("{} ", c),
                        bold.fg(Color::Green),
                    )),
                    None => spans.push(Span::styled("_ ".to_string(), dim)),
                }
            }
            spans.push(Span::styled(
                format!("  score {}", snapshot.score),
                Style::default(),
            ));
            if let Some(secs) = snapshot.remaining_secs {
                let style = if secs <= 10 {
                    bold.fg(Color::Red)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(format!("  {}s left", secs), style));
            }
        }
        _ => {
            spans.push(Span::styled(
                "arrows move nose · hold to select · enter clicks · space pauses · f face · q quits",
                dim,
            ));
        }
    }

    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}
