use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Pets);
    let block = Block::default()
        .title(format!(" Mascotas ({}) ", app.pets.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if app.pets_loading && app.pets.is_empty() {
        let skeleton = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Cargando...", styles::muted_style())),
            Line::from(Span::styled("  ▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒", styles::muted_style())),
            Line::from(Span::styled("  ▒▒▒▒▒▒▒▒▒▒▒▒", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(skeleton, area);
        return;
    }

    if let Some(ref error) = app.pets_error {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", error), styles::error_style())),
            Line::from(""),
            Line::from(Span::styled("  [r] reintentar", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    if app.pets.is_empty() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Sin mascotas registradas.", styles::muted_style())),
            Line::from(Span::styled("  [a] agregar una mascota", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    let open_id = app.selected_pet.as_ref().map(|p| p.id);
    let items: Vec<ListItem> = app
        .pets
        .iter()
        .enumerate()
        .map(|(i, pet)| {
            let marker = if open_id == Some(pet.id) { "▸" } else { " " };
            let line = Line::from(vec![
                Span::raw(format!("{} ", marker)),
                Span::raw(format!("{:<16}", truncate(&pet.name, 16))),
                Span::styled(format!("{:<8}", pet.species), styles::highlight_style()),
                Span::styled(
                    format!(
                        "{} • {} • {}",
                        truncate(&pet.breed, 14),
                        pet.sex,
                        pet.birth_date_display()
                    ),
                    styles::muted_style(),
                ),
            ]);

            let style = if i == app.pet_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.pet_selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
