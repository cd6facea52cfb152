//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::state::{
    AppState, ComposeField, FocusedPanel, LoginField, Mode, RoomField, TRENDING_LIMIT, View,
};
use crate::models::{ActionType, Post, RecommendationType};
use crate::screen::LoadState;
use crate::theme::Palette;

/// App icon
const ICON: &str = "⭐";

/// Spinner animation frames
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.palette();

    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.background));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_tabs(frame, state, chunks[0]);
    if state.auth.is_loading() {
        render_checking_session(frame, colors, chunks[1]);
    } else {
        render_main(frame, state, chunks[1]);
    }
    render_status_bar(frame, state, chunks[2]);

    match state.mode {
        Mode::Help => render_help_popup(frame, state),
        Mode::Login => render_login_popup(frame, state),
        Mode::ComposePost => render_compose_popup(frame, state),
        Mode::CreateRoom => render_room_popup(frame, state),
        Mode::ConfirmLogout => render_confirm_logout(frame, state),
        Mode::Normal => {}
    }
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.palette();

    let titles: Vec<Line> = View::all()
        .iter()
        .map(|view| {
            let marker = if *view == state.view { "●" } else { "○" };
            Line::from(format!("{marker}  {}", view.name()))
        })
        .collect();

    let mut title = format!(" {ICON} i-Recommend ");
    if state.demo {
        title.push_str("(demo) ");
    }

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(title)
                .title_style(colors.title()),
        )
        .select(state.view.index())
        .style(colors.tab())
        .highlight_style(colors.tab_active())
        .divider(Span::styled(" │ ", colors.text_dim()));

    frame.render_widget(tabs, area);
}

fn render_checking_session(frame: &mut Frame, colors: &Palette, area: Rect) {
    let message = Paragraph::new(vec![
        Line::from(""),
        Line::from(""),
        Line::styled("⏳ Checking session...", colors.text_dim()),
    ])
    .alignment(Alignment::Center)
    .block(rounded_block(colors, "", false));
    frame.render_widget(message, area);
}

fn render_main(frame: &mut Frame, state: &AppState, area: Rect) {
    match state.view {
        View::Feed => render_feed_view(frame, state, area),
        View::Rooms => render_rooms_view(frame, state, area),
        View::Trending => render_trending_view(frame, state, area),
        View::Profile => render_profile_view(frame, state, area),
    }
}

fn rounded_block<'a>(colors: &Palette, title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
    Block::default()
        .title(title)
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            colors.block_focus()
        } else {
            colors.block()
        })
}

/// Lines shown instead of a list when it has nothing to show.
///
/// Returns `None` when the items should be rendered.
fn placeholder_lines<'a>(
    state: &AppState,
    load: &LoadState,
    is_empty: bool,
    empty_message: &'a str,
) -> Option<Vec<Line<'a>>> {
    let colors = state.theme.palette();

    if state.user().is_none() {
        return Some(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  🔒 ", colors.text_info()),
                Span::styled("Sign in to see recommendations", colors.text_dim()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", colors.text_dim()),
                Span::styled("[i]", colors.key_hint()),
                Span::styled(" to sign in", colors.text_dim()),
            ]),
        ]);
    }

    match load {
        LoadState::Loading if is_empty => Some(vec![
            Line::from(""),
            Line::styled("  ⏳ Loading...", colors.text_dim()),
        ]),
        LoadState::Failed(message) if is_empty => Some(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  ❌ ", colors.text_error()),
                Span::styled(message.clone(), colors.text_error()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", colors.text_dim()),
                Span::styled("[r]", colors.key_hint()),
                Span::styled(" to retry", colors.text_dim()),
            ]),
        ]),
        _ if is_empty => Some(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  ℹ ", colors.text_info()),
                Span::styled(empty_message, colors.text_dim()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", colors.text_dim()),
                Span::styled("[r]", colors.key_hint()),
                Span::styled(" to refresh", colors.text_dim()),
            ]),
        ]),
        _ => None,
    }
}

/// Pad `text` with spaces to `width` display columns
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

fn verdict_style(colors: &Palette, recommendation: RecommendationType) -> Style {
    match recommendation {
        RecommendationType::Recommend => colors.text_success(),
        RecommendationType::NotRecommend => colors.text_error(),
    }
}

fn render_feed_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.palette();

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let list_block = rounded_block(
        colors,
        format!(" 📰 Feed ({}) ", state.feed.items().len()),
        state.focused_panel == FocusedPanel::List,
    );

    if let Some(lines) = placeholder_lines(
        state,
        state.feed.state(),
        state.feed.items().is_empty(),
        "No recommendations yet",
    ) {
        frame.render_widget(Paragraph::new(lines).block(list_block), horizontal[0]);
        render_detail_placeholder(frame, state, horizontal[1]);
        return;
    }

    let width = horizontal[0].width.saturating_sub(3) as usize;
    let items: Vec<ListItem> = state
        .feed
        .items()
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let is_selected = i == state.feed.selected_index();
            let base = if is_selected {
                colors.selected()
            } else {
                Style::default()
            };

            let heart = if post.liked { " ❤️" } else { "" };
            let header = format!(
                " {} @{} · {} · {}{heart}",
                post.recommendation_type.emoji(),
                post.user.username,
                post.room.name,
                post.relative_time()
            );

            let mut lines = vec![
                Line::styled(pad(&header, width), base.patch(colors.text_primary())),
                Line::styled(
                    pad(&format!("   {}", post.title), width),
                    base.patch(colors.title()),
                ),
            ];
            for chunk in textwrap::wrap(&post.preview(140), width.saturating_sub(4).max(1)) {
                lines.push(Line::styled(
                    pad(&format!("   {chunk}"), width),
                    base.patch(colors.text()),
                ));
            }
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).block(list_block);
    let mut list_state = ListState::default();
    list_state.select(Some(state.feed.selected_index()));
    frame.render_stateful_widget(list, horizontal[0], &mut list_state);

    match state.feed.selected() {
        Some(post) => render_post_detail(frame, state, post, horizontal[1]),
        None => render_detail_placeholder(frame, state, horizontal[1]),
    }
}

fn render_detail_placeholder(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.palette();
    let empty = Paragraph::new(vec![
        Line::from(""),
        Line::from(""),
        Line::styled("  Select a post", colors.text_dim()),
    ])
    .block(rounded_block(colors, " 📝 Recommendation ", false));
    frame.render_widget(empty, area);
}

fn render_post_detail(frame: &mut Frame, state: &AppState, post: &Post, area: Rect) {
    let colors = state.theme.palette();
    let text_width = area.width.saturating_sub(6).max(1) as usize;

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                post.user.name.clone(),
                colors.text_primary().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" @{}", post.user.username), colors.text_dim()),
        ]),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("■ ", room_color_style(post.room.color.as_str())),
            Span::styled(post.room.name.clone(), colors.text()),
            Span::styled(format!(" · {}", post.relative_time()), colors.text_dim()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                format!(
                    "{} {}",
                    post.recommendation_type.emoji(),
                    post.recommendation_type.label()
                ),
                verdict_style(colors, post.recommendation_type),
            ),
            Span::styled(
                format!("   {} {}", post.action_type.emoji(), post.action_type.name()),
                colors.text_info(),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(post.title.clone(), colors.title()),
        ]),
        Line::from(""),
    ];

    for line in post.description.lines() {
        for chunk in textwrap::wrap(line, text_width) {
            content.push(Line::from(vec![
                Span::styled("  ", Style::default()),
                Span::styled(chunk.into_owned(), colors.text()),
            ]));
        }
    }

    if !post.tags.is_empty() {
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(post.hashtags(), colors.text_primary()),
        ]));
    }
    if let Some(label) = post.media_label() {
        content.push(Line::styled(format!("  [{label}]"), colors.text_dim()));
    }
    if let Some(link) = &post.external_link {
        content.push(Line::from(vec![
            Span::styled("  🔗 ", Style::default()),
            Span::styled(link.clone(), colors.text_info().add_modifier(Modifier::UNDERLINED)),
        ]));
    }

    let like_icon = if post.liked { "❤️" } else { "♡" };
    let pending = if state.feed.like_in_flight(&post.id) {
        " ⏳"
    } else {
        ""
    };
    content.push(Line::from(""));
    content.push(Line::styled("  ─────────────────────────────────", colors.text_dim()));
    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            format!("{like_icon} {}{pending}", post.like_count),
            if post.liked {
                colors.text_error()
            } else {
                colors.text_dim()
            },
        ),
        Span::styled(format!("   💬 {}", post.comment_count), colors.text_dim()),
        Span::styled(format!("   ↻ {}", post.repost_count), colors.text_dim()),
    ]));

    content.push(Line::from(""));
    content.push(Line::styled("  ── Comments ──────────────────────", colors.text_dim()));

    let showing_this_post = state.comments_for.as_deref() == Some(post.id.as_str());
    match state.comments.state() {
        LoadState::Loading if showing_this_post => {
            content.push(Line::styled("  ⏳ Loading comments...", colors.text_dim()));
        }
        LoadState::Failed(message) if showing_this_post => {
            content.push(Line::styled(format!("  ❌ {message}"), colors.text_error()));
        }
        _ if !showing_this_post || state.comments.items().is_empty() => {
            content.push(Line::styled("  No comments yet", colors.text_dim()));
        }
        _ => {
            for comment in state.comments.items() {
                content.push(Line::from(""));
                content.push(Line::from(vec![
                    Span::styled("  ", Style::default()),
                    Span::styled(format!("@{}", comment.user.username), colors.text_primary()),
                    Span::styled(format!(" · {}", comment.relative_time()), colors.text_dim()),
                ]));
                for chunk in textwrap::wrap(&comment.content, text_width.saturating_sub(2).max(1))
                {
                    content.push(Line::from(vec![
                        Span::styled("    ", Style::default()),
                        Span::styled(chunk.into_owned(), colors.text()),
                    ]));
                }
            }
        }
    }

    let detail = Paragraph::new(content)
        .block(rounded_block(
            colors,
            " 📝 Recommendation ",
            state.focused_panel == FocusedPanel::Detail,
        ))
        .wrap(Wrap { trim: false })
        .scroll((state.detail_scroll, 0));
    frame.render_widget(detail, area);
}

fn room_color_style(hex: &str) -> Style {
    crate::models::parse_hex_color(hex)
        .map_or_else(Style::default, |(r, g, b)| Style::default().fg(Color::Rgb(r, g, b)))
}

fn render_rooms_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.palette();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let block = rounded_block(
        colors,
        format!(" 🏠 My Rooms ({}) ", state.rooms.items().len()),
        true,
    );

    if let Some(lines) = placeholder_lines(
        state,
        state.rooms.state(),
        state.rooms.items().is_empty(),
        "No rooms yet, press [c] to create one",
    ) {
        frame.render_widget(Paragraph::new(lines).block(block), layout[0]);
    } else {
        let width = layout[0].width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = state
            .rooms
            .items()
            .iter()
            .enumerate()
            .map(|(i, room)| {
                let is_selected = i == state.rooms.selected_index();
                let cursor = if is_selected { "▸" } else { " " };
                let bg = if is_selected {
                    colors.selected()
                } else {
                    Style::default()
                };
                let swatch = room
                    .rgb()
                    .map_or_else(Style::default, |(r, g, b)| Style::default().fg(Color::Rgb(r, g, b)));

                let posts = match room.post_count {
                    1 => "1 post".to_string(),
                    n => format!("{n} posts"),
                };
                let name = format!(" {}", room.name);
                let meta = format!("     {posts}");

                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!(" {cursor} "), bg),
                        Span::styled("██", swatch.patch(bg)),
                        Span::styled(
                            pad(&name, width.saturating_sub(5)),
                            colors.text().patch(bg),
                        ),
                    ]),
                    Line::styled(pad(&meta, width), colors.text_dim().patch(bg)),
                    Line::from(""),
                ])
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(state.rooms.selected_index()));
        frame.render_stateful_widget(List::new(items).block(block), layout[0], &mut list_state);
    }

    let action_bar = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled("[c]", colors.key_hint()),
        Span::styled(" New room  ", colors.text_dim()),
        Span::styled("[n]", colors.key_hint()),
        Span::styled(" Post here  ", colors.text_dim()),
        Span::styled("[r]", colors.key_hint()),
        Span::styled(" Refresh", colors.text_dim()),
    ]);
    frame.render_widget(
        Paragraph::new(action_bar).style(Style::default().bg(colors.surface_secondary)),
        layout[1],
    );
}

fn render_trending_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.palette();
    let block = rounded_block(colors, " 🔥 Trending ", true);

    if let Some(lines) = placeholder_lines(
        state,
        state.feed.state(),
        state.feed.items().is_empty(),
        "Nothing trending yet",
    ) {
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = state
        .feed
        .trending(TRENDING_LIMIT)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_selected = i == state.trending_selected;
            let bg = if is_selected {
                colors.selected()
            } else {
                Style::default()
            };
            let post = entry.post;
            let heart = if post.liked { "❤️" } else { "♡" };

            let title = format!(" #{:<2} {}", entry.rank, post.title);
            let stats = format!(
                "     {heart} {}  💬 {}  ↻ {}  · @{} in {}",
                post.like_count,
                post.comment_count,
                post.repost_count,
                post.user.username,
                post.room.name
            );
            let reason = format!("     {}", entry.reason);

            ListItem::new(vec![
                Line::styled(pad(&title, width), colors.title().patch(bg)),
                Line::styled(pad(&stats, width), colors.text_dim().patch(bg)),
                Line::styled(pad(&reason, width), colors.text_warning().patch(bg)),
                Line::from(""),
            ])
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(state.trending_selected));
    frame.render_stateful_widget(List::new(items).block(block), area, &mut list_state);
}

fn render_profile_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.palette();
    let block = rounded_block(colors, " 👤 Profile ", true);

    let Some(user) = state.user() else {
        let lines = placeholder_lines(state, &LoadState::Idle, true, "").unwrap_or_default();
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                user.name.clone(),
                colors.text_primary().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::styled(format!("  {}", user.handle()), colors.text_dim()),
    ];
    if !user.email.is_empty() {
        content.push(Line::styled(format!("  ✉ {}", user.email), colors.text_dim()));
    }
    content.push(Line::from(""));

    if let Some(bio) = &user.bio {
        for chunk in textwrap::wrap(bio, area.width.saturating_sub(6).max(1) as usize) {
            content.push(Line::styled(format!("  {chunk}"), colors.text()));
        }
        content.push(Line::from(""));
    }
    if let Some(link) = &user.external_link {
        content.push(Line::from(vec![
            Span::styled("  🔗 ", Style::default()),
            Span::styled(link.clone(), colors.text_info()),
        ]));
        content.push(Line::from(""));
    }

    let own_posts = state
        .feed
        .items()
        .iter()
        .filter(|p| p.user.id == user.id)
        .count();
    content.push(Line::from(vec![
        Span::styled(format!("  {}", user.follower_count), colors.title()),
        Span::styled(" followers   ", colors.text_dim()),
        Span::styled(user.following_count.to_string(), colors.title()),
        Span::styled(" following   ", colors.text_dim()),
        Span::styled(state.rooms.items().len().to_string(), colors.title()),
        Span::styled(" rooms   ", colors.text_dim()),
        Span::styled(own_posts.to_string(), colors.title()),
        Span::styled(" posts in feed", colors.text_dim()),
    ]));

    content.push(Line::from(""));
    content.push(Line::styled("  ─────────────────────────────────", colors.text_dim()));
    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Theme: ", colors.text_dim()),
        Span::styled(state.theme.mode_name(), colors.text()),
        Span::styled("   ", Style::default()),
        Span::styled("[t]", colors.key_hint()),
        Span::styled(" toggle", colors.text_dim()),
    ]));
    content.push(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled("[x]", colors.key_hint()),
        Span::styled(" Sign out", colors.text_dim()),
    ]));

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.palette();

    let loading_indicator = if state.is_busy() {
        let frame_idx = (state.current_tick() / 2) as usize % SPINNER.len();
        format!("{} ", SPINNER[frame_idx])
    } else {
        String::new()
    };

    let content = if state.status.is_empty() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_dim()),
            Span::styled("Tab", colors.key_hint()),
            Span::styled(": views  ", colors.text_dim()),
            Span::styled("?", colors.key_hint()),
            Span::styled(": help  ", colors.text_dim()),
            Span::styled("t", colors.key_hint()),
            Span::styled(": theme  ", colors.text_dim()),
            Span::styled("q", colors.key_hint()),
            Span::styled(": quit", colors.text_dim()),
        ]
    } else {
        let style = if state.status.starts_with('❌') {
            colors.text_error()
        } else if state.status.starts_with('⚠') {
            colors.text_warning()
        } else {
            colors.text_dim()
        };
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_dim()),
            Span::styled(state.status.as_str(), style),
        ]
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.surface_secondary));
    frame.render_widget(status, area);
}

fn help_section<'a>(colors: &Palette, title: &'a str) -> Line<'a> {
    Line::from(vec![Span::styled(
        format!("  {title}"),
        colors.text_primary().add_modifier(Modifier::BOLD),
    )])
}

fn help_key<'a>(colors: &Palette, keys: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {keys:<17}"), colors.key_hint()),
        Span::styled(action, colors.text()),
    ])
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.palette();
    let popup_area = centered_rect(50, 70, frame.area());

    frame.render_widget(Clear, popup_area);

    let help_content = vec![
        Line::from(""),
        help_section(colors, "Navigation"),
        help_key(colors, "Tab / Shift+Tab", "Switch between views"),
        help_key(colors, "1-4", "Jump to Feed/Rooms/Trending/Profile"),
        help_key(colors, "h/l or ←/→", "Switch panels"),
        help_key(colors, "j/k or ↑/↓", "Navigate items / scroll"),
        help_key(colors, "g/G", "Go to first/last item"),
        help_key(colors, "Ctrl+d/u", "Page down/up in detail"),
        Line::from(""),
        help_section(colors, "Feed & Trending"),
        help_key(colors, "L / Space", "Like/unlike"),
        help_key(colors, "o", "Open link in browser"),
        help_key(colors, "n", "New recommendation"),
        help_key(colors, "r", "Refresh / retry"),
        Line::from(""),
        help_section(colors, "Rooms"),
        help_key(colors, "c", "Create room"),
        help_key(colors, "n / Enter", "Post in selected room"),
        Line::from(""),
        help_section(colors, "Forms"),
        help_key(colors, "Tab / ↑↓", "Next/previous field"),
        help_key(colors, "←/→ / Space", "Change choice"),
        help_key(colors, "Ctrl+S", "Submit"),
        help_key(colors, "Esc", "Cancel"),
        Line::from(""),
        help_section(colors, "General"),
        help_key(colors, "i", "Sign in"),
        help_key(colors, "x", "Sign out (Profile)"),
        help_key(colors, "t", "Toggle dark/light mode"),
        help_key(colors, "?", "Toggle this help"),
        help_key(colors, "q", "Quit application"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", colors.text_dim()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" or ", colors.text_dim()),
            Span::styled("?", colors.key_hint()),
            Span::styled(" to close", colors.text_dim()),
        ]),
    ];

    let help = Paragraph::new(help_content)
        .block(
            rounded_block(colors, " ⌨ Keyboard Shortcuts ", true)
                .style(Style::default().bg(colors.surface_secondary)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

/// One labelled input row of a form
fn form_field<'a>(
    colors: &Palette,
    label: &'a str,
    value: String,
    focused: bool,
    placeholder: &'a str,
) -> Line<'a> {
    let marker = if focused { "▸ " } else { "  " };
    let label_style = if focused {
        colors.text_primary().add_modifier(Modifier::BOLD)
    } else {
        colors.text_dim()
    };
    let (value, value_style) = if value.is_empty() {
        (placeholder.to_string(), colors.text_dim())
    } else {
        (value, colors.text())
    };
    let cursor = if focused { "█" } else { "" };

    Line::from(vec![
        Span::styled(format!(" {marker}{label:<14}"), label_style),
        Span::styled(value, value_style),
        Span::styled(cursor, colors.text_primary()),
    ])
}

fn render_login_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.palette();
    let popup_area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, popup_area);

    let form = &state.login_form;
    let masked = "•".repeat(form.password.chars().count());
    let submitting = if state.submitting {
        "  ⏳ Signing in..."
    } else {
        ""
    };

    let content = vec![
        Line::from(""),
        Line::styled("  Welcome to i-Recommend", colors.title()),
        Line::styled("  Sign in to share recommendations", colors.text_dim()),
        Line::from(""),
        form_field(
            colors,
            "Email",
            form.email.clone(),
            form.field == LoginField::Email,
            "you@example.com",
        ),
        form_field(
            colors,
            "Password",
            masked,
            form.field == LoginField::Password,
            "",
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("Enter", colors.key_hint()),
            Span::styled(" sign in  ", colors.text_dim()),
            Span::styled("Tab", colors.key_hint()),
            Span::styled(" switch field  ", colors.text_dim()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" close", colors.text_dim()),
            Span::styled(submitting, colors.text_info()),
        ]),
    ];

    let popup = Paragraph::new(content).block(
        rounded_block(colors, " 🔑 Sign In ", true)
            .style(Style::default().bg(colors.surface_secondary)),
    );
    frame.render_widget(popup, popup_area);
}

fn render_compose_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.palette();
    let popup_area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, popup_area);

    let form = &state.compose_form;
    let focused = |field: ComposeField| form.field == field;
    let room = state
        .compose_room()
        .map_or_else(|| "No rooms".to_string(), |r| format!("◂ {} ▸", r.name));
    let recommendation = format!(
        "◂ {} {} ▸",
        form.recommendation_type.emoji(),
        form.recommendation_type.label()
    );
    let action = ActionType::all()
        .iter()
        .map(|a| {
            if *a == form.action_type {
                format!("[{} {}]", a.emoji(), a.name())
            } else {
                a.name().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let counter = |text: &str, max: usize| {
        let count = text.chars().count();
        let style = if count >= max {
            colors.text_warning()
        } else {
            colors.text_dim()
        };
        Span::styled(format!("  {count}/{max}"), style)
    };

    let mut title_line = form_field(
        colors,
        "Title",
        form.title.clone(),
        focused(ComposeField::Title),
        "What are you recommending?",
    );
    title_line
        .spans
        .push(counter(&form.title, crate::models::MAX_TITLE_CHARS));

    let description_width = popup_area.width.saturating_sub(22).max(1) as usize;
    let mut description_lines: Vec<Line> = Vec::new();
    let wrapped = textwrap::wrap(&form.description, description_width);
    for (i, chunk) in wrapped.iter().enumerate() {
        if i == 0 {
            description_lines.push(form_field(
                colors,
                "Description",
                chunk.to_string(),
                focused(ComposeField::Description),
                "",
            ));
        } else {
            description_lines.push(Line::styled(format!("{:17}{chunk}", ""), colors.text()));
        }
    }
    if description_lines.is_empty() {
        description_lines.push(form_field(
            colors,
            "Description",
            String::new(),
            focused(ComposeField::Description),
            "Tell people why",
        ));
    }
    if let Some(last) = description_lines.last_mut() {
        last.spans.push(counter(
            &form.description,
            crate::models::MAX_DESCRIPTION_CHARS,
        ));
    }

    let mut content = vec![
        Line::from(""),
        form_field(colors, "Room", room, focused(ComposeField::Room), ""),
        title_line,
    ];
    content.extend(description_lines);
    content.extend([
        form_field(
            colors,
            "Tags",
            form.tags.clone(),
            focused(ComposeField::Tags),
            "comma, separated",
        ),
        form_field(
            colors,
            "Link",
            form.link.clone(),
            focused(ComposeField::Link),
            "https://",
        ),
        form_field(
            colors,
            "Verdict",
            recommendation,
            focused(ComposeField::Recommendation),
            "",
        ),
        form_field(colors, "Action", action, focused(ComposeField::Action), ""),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("Tab", colors.key_hint()),
            Span::styled(" next  ", colors.text_dim()),
            Span::styled("←/→", colors.key_hint()),
            Span::styled(" change  ", colors.text_dim()),
            Span::styled("Ctrl+S", colors.key_hint()),
            Span::styled(" post  ", colors.text_dim()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" cancel", colors.text_dim()),
        ]),
    ]);
    if state.submitting {
        content.push(Line::styled("  ⏳ Posting...", colors.text_info()));
    }

    let popup = Paragraph::new(content).block(
        rounded_block(colors, " ✏️ New Recommendation ", true)
            .style(Style::default().bg(colors.surface_secondary)),
    );
    frame.render_widget(popup, popup_area);
}

fn render_room_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.palette();
    let popup_area = centered_rect(50, 35, frame.area());
    frame.render_widget(Clear, popup_area);

    let form = &state.room_form;
    let color_focused = form.field == RoomField::Color;

    let mut swatches = vec![Span::styled(
        format!(" {}{:<14}", if color_focused { "▸ " } else { "  " }, "Colour"),
        if color_focused {
            colors.text_primary().add_modifier(Modifier::BOLD)
        } else {
            colors.text_dim()
        },
    )];
    for (i, hex) in crate::models::ROOM_COLORS.iter().enumerate() {
        let symbol = if i == form.color_index { "[█]" } else { " █ " };
        swatches.push(Span::styled(symbol, room_color_style(hex)));
    }

    let mut name_line = form_field(
        colors,
        "Name",
        form.name.clone(),
        form.field == RoomField::Name,
        "e.g. Coffee",
    );
    name_line.spans.push(Span::styled(
        format!(
            "  {}/{}",
            form.name.chars().count(),
            crate::models::MAX_ROOM_NAME_CHARS
        ),
        colors.text_dim(),
    ));

    let content = vec![
        Line::from(""),
        name_line,
        Line::from(swatches),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("Enter", colors.key_hint()),
            Span::styled(" create  ", colors.text_dim()),
            Span::styled("Tab", colors.key_hint()),
            Span::styled(" switch field  ", colors.text_dim()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" cancel", colors.text_dim()),
        ]),
    ];

    let popup = Paragraph::new(content).block(
        rounded_block(colors, " 🏠 New Room ", true)
            .style(Style::default().bg(colors.surface_secondary)),
    );
    frame.render_widget(popup, popup_area);
}

fn render_confirm_logout(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.palette();
    let popup_area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::styled("Sign out of i-Recommend?", colors.title()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", colors.key_hint()),
            Span::styled(" Yes   ", colors.text_dim()),
            Span::styled("[n]", colors.key_hint()),
            Span::styled(" No", colors.text_dim()),
        ]),
    ];

    let popup = Paragraph::new(content).alignment(Alignment::Center).block(
        rounded_block(colors, " Sign Out ", true)
            .style(Style::default().bg(colors.surface_secondary)),
    );
    frame.render_widget(popup, popup_area);
}

/// Helper function to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = (r.width as u32 * percent_x as u32 / 100) as u16;
    let popup_height = (r.height as u32 * percent_y as u32 / 100) as u16;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}
