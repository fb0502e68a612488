use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::app::NodeStatus;

pub fn render(frame: &mut Frame, status: &NodeStatus) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Min(0),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], status);
    render_gate(frame, chunks[1], status);
    render_link(frame, chunks[2], status);
    render_coupling(frame, chunks[3], status);
    render_help(frame, chunks[4]);
}

fn render_header(frame: &mut Frame, area: Rect, status: &NodeStatus) {
    let title = format!(
        " Tether {} - Uptime: {} ",
        status.role,
        format_duration(status.uptime_secs)
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = format!(
        "Tick: {}  |  Motion: {:?}  |  Overruns: {}",
        status.session.ticks, status.motion, status.overruns
    );

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_gate(frame: &mut Frame, area: Rect, status: &NodeStatus) {
    let block = Block::default()
        .title(" Perceptual Gate ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let session = &status.session;
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(session.transmit_ratio().clamp(0.0, 1.0))
        .label(format!(
            "{} sent / {} suppressed",
            session.transmitted, session.suppressed
        ));

    frame.render_widget(gauge, area);
}

fn render_link(frame: &mut Frame, area: Rect, status: &NodeStatus) {
    let block = Block::default()
        .title(" Link ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let net = &status.network;
    let loss_percent = net.packet_loss_percent();
    let lines = vec![
        stat_line(
            "Packets: ",
            format!("{} sent / {} recv", net.packets_sent, net.packets_received()),
        ),
        stat_line(
            "Bytes: ",
            format!(
                "{} sent / {} recv",
                format_bytes(net.bytes_sent),
                format_bytes(net.bytes_received)
            ),
        ),
        stat_line(
            "Latest Seq: ",
            format!(
                "{}  (malformed {}, send failures {}, simulated drops {})",
                status.highest_sequence,
                net.malformed_dropped,
                net.send_failures,
                net.simulated_drops
            ),
        ),
        Line::from(vec![
            Span::styled("Packet Loss: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.1}% ({} lost)", loss_percent, net.loss.lost()),
                Style::default().fg(if loss_percent > 5.0 {
                    Color::Red
                } else {
                    Color::White
                }),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_coupling(frame: &mut Frame, area: Rect, status: &NodeStatus) {
    let block = Block::default()
        .title(" Coupling ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let session = &status.session;
    let lines = vec![
        stat_line(
            "Updates: ",
            format!(
                "{} fresh / {} predicted / {} stale",
                session.fresh_updates, session.predicted_updates, session.stale_ignored
            ),
        ),
        stat_line("Position: ", format_vec(status.position)),
        stat_line("Target: ", format_vec(session.last_target)),
        stat_line(
            "Force: ",
            format!(
                "{}  |{:.4}|  pos delta {:.5}",
                format_vec(session.last_force),
                session.last_force.length(),
                status.pos_delta
            ),
        ),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new("Press 'q' or ESC to quit")
        .block(block)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        );

    frame.render_widget(text, area);
}

fn stat_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn format_vec(v: glam::DVec3) -> String {
    format!("({:+.4}, {:+.4}, {:+.4})", v.x, v.y, v.z)
}

fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_uptime() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(3725), "01:02:05");
    }

    #[test]
    fn test_formats_bytes() {
        assert_eq!(format_bytes(36), "36B");
        assert_eq!(format_bytes(36 * 1000), "35.2KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0MB");
    }
}
