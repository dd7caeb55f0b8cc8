//! Application state management for petbook.
//!
//! The `App` struct owns all UI state plus the shared resource cache,
//! and coordinates background tasks: key handlers spawn tokio tasks
//! that call the cache, results come back over an mpsc channel and are
//! drained once per event-loop tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use petbook_core::api::{ApiClient, ApiError};
use petbook_core::cache::{InvalidationTarget, ResourceCache};
use petbook_core::forms::{CareDraft, FieldError, PetDraft};
use petbook_core::models::{CareEvent, CareKind, Pet, Sex, Species};
use petbook_core::rules;

use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 leaves headroom over the handful of in-flight operations the UI
/// can trigger at once.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Maximum length for name/breed inputs (the server's bound).
const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for care descriptions (the server's bound).
const MAX_DESCRIPTION_LENGTH: usize = 500;

// ============================================================================
// UI State Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Browsing,
    AddingPet,
    AddingCare,
    ConfirmingDelete,
    ShowingHelp,
    Quitting,
}

/// Which pane list navigation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pets,
    Cares,
}

/// What a pending delete confirmation would remove.
#[derive(Debug, Clone)]
pub enum DeleteTarget {
    Pet { id: i64, name: String },
    Care { pet_id: i64, care_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient notification; pruned after `TOAST_TTL`.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    created: Instant,
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetField {
    Name,
    Species,
    Breed,
    BirthDate,
    Sex,
}

impl PetField {
    pub fn next(self) -> Self {
        match self {
            PetField::Name => PetField::Species,
            PetField::Species => PetField::Breed,
            PetField::Breed => PetField::BirthDate,
            PetField::BirthDate => PetField::Sex,
            PetField::Sex => PetField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PetField::Name => PetField::Sex,
            PetField::Species => PetField::Name,
            PetField::Breed => PetField::Species,
            PetField::BirthDate => PetField::Breed,
            PetField::Sex => PetField::BirthDate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PetFormState {
    pub draft: PetDraft,
    pub focus: PetField,
    pub errors: Vec<FieldError>,
    pub submitting: bool,
}

impl Default for PetFormState {
    fn default() -> Self {
        Self {
            draft: PetDraft::default(),
            focus: PetField::Name,
            errors: Vec::new(),
            submitting: false,
        }
    }
}

impl PetFormState {
    pub fn push_char(&mut self, c: char) {
        match self.focus {
            PetField::Name => push_bounded(&mut self.draft.name, c, MAX_NAME_LENGTH),
            PetField::Breed => push_bounded(&mut self.draft.breed, c, MAX_NAME_LENGTH),
            PetField::BirthDate => {
                if (c.is_ascii_digit() || c == '-') && self.draft.birth_date.len() < 10 {
                    self.draft.birth_date.push(c);
                }
            }
            PetField::Species | PetField::Sex => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            PetField::Name => {
                self.draft.name.pop();
            }
            PetField::Breed => {
                self.draft.breed.pop();
            }
            PetField::BirthDate => {
                self.draft.birth_date.pop();
            }
            PetField::Species | PetField::Sex => {}
        }
    }

    /// Left/Right on an enum field steps through its variants.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            PetField::Species => self.draft.species = cycled(&Species::ALL, self.draft.species, forward),
            PetField::Sex => self.draft.sex = cycled(&Sex::ALL, self.draft.sex, forward),
            _ => {}
        }
    }

    pub fn error_for(&self, field: &str) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareField {
    Kind,
    Date,
    Time,
    Description,
}

impl CareField {
    pub fn next(self) -> Self {
        match self {
            CareField::Kind => CareField::Date,
            CareField::Date => CareField::Time,
            CareField::Time => CareField::Description,
            CareField::Description => CareField::Kind,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            CareField::Kind => CareField::Description,
            CareField::Date => CareField::Kind,
            CareField::Time => CareField::Date,
            CareField::Description => CareField::Time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CareFormState {
    pub draft: CareDraft,
    pub focus: CareField,
    pub error: Option<&'static str>,
    pub submitting: bool,
}

impl Default for CareFormState {
    fn default() -> Self {
        Self {
            draft: CareDraft::default(),
            focus: CareField::Kind,
            error: None,
            submitting: false,
        }
    }
}

impl CareFormState {
    pub fn push_char(&mut self, c: char) {
        match self.focus {
            CareField::Date => {
                if (c.is_ascii_digit() || c == '-') && self.draft.date.len() < 10 {
                    self.draft.date.push(c);
                }
            }
            CareField::Time => {
                if (c.is_ascii_digit() || c == ':') && self.draft.time.len() < 5 {
                    self.draft.time.push(c);
                }
            }
            CareField::Description => {
                push_bounded(&mut self.draft.description, c, MAX_DESCRIPTION_LENGTH)
            }
            CareField::Kind => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            CareField::Date => {
                self.draft.date.pop();
            }
            CareField::Time => {
                self.draft.time.pop();
            }
            CareField::Description => {
                self.draft.description.pop();
            }
            CareField::Kind => {}
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        if self.focus == CareField::Kind {
            self.draft.kind = cycled(&CareKind::ALL, self.draft.kind, forward);
        }
    }
}

fn push_bounded(value: &mut String, c: char, max: usize) {
    if value.chars().count() < max {
        value.push(c);
    }
}

fn cycled<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let len = all.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    all[next]
}

// ============================================================================
// Background task results
// ============================================================================

enum TaskResult {
    /// Pets page fetched (or refetched after invalidation)
    Pets(Result<Vec<Pet>, ApiError>),
    /// Care list for one pet fetched (pet_id, cares)
    Cares(i64, Result<Vec<CareEvent>, ApiError>),
    /// Outcome of a create-pet mutation
    PetCreated(Result<Pet, ApiError>),
    /// Outcome of a delete-pet mutation (deleted id)
    PetDeleted(i64, Result<(), ApiError>),
    /// Outcome of a create-care mutation (owning pet id)
    CareCreated(i64, Result<CareEvent, ApiError>),
    /// Outcome of a delete-care mutation (owning pet id)
    CareDeleted(i64, Result<(), ApiError>),
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    cache: Arc<ResourceCache<ApiClient>>,

    pub state: AppState,
    pub focus: Focus,

    // Pets pane
    pub pets: Vec<Pet>,
    pub pets_loading: bool,
    pub pets_error: Option<String>,
    pub pet_selection: usize,

    // Cares pane (for the selected pet)
    pub selected_pet: Option<Pet>,
    pub cares: Vec<CareEvent>,
    pub cares_loading: bool,
    pub cares_error: Option<String>,
    pub care_selection: usize,

    // Forms and overlays
    pub pet_form: PetFormState,
    pub care_form: CareFormState,
    pub delete_target: Option<DeleteTarget>,

    pub toasts: Vec<Toast>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(config.api_url())?;
        let cache = Arc::new(ResourceCache::new(api));
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            cache,

            state: AppState::Browsing,
            focus: Focus::Pets,

            pets: Vec::new(),
            pets_loading: false,
            pets_error: None,
            pet_selection: 0,

            selected_pet: None,
            cares: Vec::new(),
            cares_loading: false,
            cares_error: None,
            care_selection: 0,

            pet_form: PetFormState::default(),
            care_form: CareFormState::default(),
            delete_target: None,

            toasts: Vec::new(),

            task_rx,
            task_tx,
        })
    }

    // =========================================================================
    // Data loading
    // =========================================================================

    pub fn load_pets(&mut self) {
        self.pets_loading = true;
        self.pets_error = None;
        let cache = Arc::clone(&self.cache);
        let tx = self.task_tx.clone();
        let limit = self.config.page_limit();
        tokio::spawn(async move {
            let result = cache.pets(limit, 0).await;
            let _ = tx.send(TaskResult::Pets(result)).await;
        });
    }

    pub fn load_cares(&mut self, pet_id: i64) {
        self.cares_loading = true;
        self.cares_error = None;
        let cache = Arc::clone(&self.cache);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = cache.cares(pet_id).await;
            let _ = tx.send(TaskResult::Cares(pet_id, result)).await;
        });
    }

    /// Force-refetch the visible listings.
    pub fn refresh(&mut self) {
        info!("Refreshing listings");
        self.pets_loading = true;
        self.pets_error = None;
        let selected = self.selected_pet.as_ref().map(|p| p.id);
        if selected.is_some() {
            self.cares_loading = true;
            self.cares_error = None;
        }

        let cache = Arc::clone(&self.cache);
        let tx = self.task_tx.clone();
        let limit = self.config.page_limit();
        tokio::spawn(async move {
            cache.invalidate(InvalidationTarget::Pets).await;
            match selected {
                Some(pet_id) => {
                    cache.invalidate(InvalidationTarget::CaresFor(pet_id)).await;
                    let (pets, cares) = futures::join!(cache.pets(limit, 0), cache.cares(pet_id));
                    let _ = tx.send(TaskResult::Pets(pets)).await;
                    let _ = tx.send(TaskResult::Cares(pet_id, cares)).await;
                }
                None => {
                    let pets = cache.pets(limit, 0).await;
                    let _ = tx.send(TaskResult::Pets(pets)).await;
                }
            }
        });
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn highlighted_pet(&self) -> Option<&Pet> {
        self.pets.get(self.pet_selection)
    }

    pub fn highlighted_care(&self) -> Option<&CareEvent> {
        self.cares.get(self.care_selection)
    }

    pub fn move_selection(&mut self, down: bool) {
        let (selection, len) = match self.focus {
            Focus::Pets => (&mut self.pet_selection, self.pets.len()),
            Focus::Cares => (&mut self.care_selection, self.cares.len()),
        };
        if len == 0 {
            return;
        }
        if down {
            *selection = (*selection + 1).min(len - 1);
        } else {
            *selection = selection.saturating_sub(1);
        }
    }

    /// Enter on a pet opens its care list; on the already-open pet it
    /// closes the pane instead (the original list's "Cuidados"/"Ocultar"
    /// toggle).
    pub fn toggle_cares_pane(&mut self) {
        let Some(pet) = self.highlighted_pet().cloned() else {
            return;
        };
        match &self.selected_pet {
            Some(selected) if selected.id == pet.id => {
                self.selected_pet = None;
                self.cares.clear();
                self.cares_error = None;
                self.focus = Focus::Pets;
            }
            _ => {
                self.care_selection = 0;
                self.selected_pet = Some(pet.clone());
                self.load_cares(pet.id);
            }
        }
    }

    // =========================================================================
    // Forms
    // =========================================================================

    pub fn start_add_pet(&mut self) {
        self.pet_form = PetFormState::default();
        self.state = AppState::AddingPet;
    }

    /// Care events belong to a pet, so the form needs one selected.
    pub fn start_add_care(&mut self) {
        if self.selected_pet.is_none() {
            self.show_toast("Seleccione una mascota primero.", ToastKind::Error);
            return;
        }
        self.care_form = CareFormState::default();
        self.state = AppState::AddingCare;
    }

    pub fn submit_pet_form(&mut self) {
        if self.pet_form.submitting {
            return;
        }
        let today = rules::today_local();
        let errors = self.pet_form.draft.validate(&today);
        if !errors.is_empty() {
            if let Some(first) = errors.first() {
                self.show_toast(first.message, ToastKind::Error);
            }
            self.pet_form.errors = errors;
            return;
        }
        self.pet_form.errors.clear();
        self.pet_form.submitting = true;

        let new_pet = self.pet_form.draft.to_new_pet();
        let cache = Arc::clone(&self.cache);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = cache.create_pet_and_refresh(&new_pet).await;
            let _ = tx.send(TaskResult::PetCreated(result)).await;
        });
    }

    pub fn submit_care_form(&mut self) {
        if self.care_form.submitting {
            return;
        }
        let Some(pet_id) = self.selected_pet.as_ref().map(|p| p.id) else {
            return;
        };
        let today = rules::today_local();
        if let Some(message) = self.care_form.draft.validate(&today) {
            self.care_form.error = Some(message);
            self.show_toast(message, ToastKind::Error);
            return;
        }
        let timestamp =
            match rules::combine_to_timestamp(&self.care_form.draft.date, &self.care_form.draft.time) {
                Ok(ts) => ts,
                Err(e) => {
                    warn!(error = %e, "Rejecting unparseable care schedule");
                    self.show_toast(e.to_string(), ToastKind::Error);
                    return;
                }
            };
        self.care_form.error = None;
        self.care_form.submitting = true;

        let new_care = petbook_core::models::NewCare::new(
            self.care_form.draft.kind,
            self.care_form.draft.description.trim(),
            timestamp,
        );
        let cache = Arc::clone(&self.cache);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = cache.create_care_and_refresh(pet_id, &new_care).await;
            let _ = tx.send(TaskResult::CareCreated(pet_id, result)).await;
        });
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Ask for confirmation before deleting whatever the focused pane
    /// has highlighted.
    pub fn request_delete(&mut self) {
        let target = match self.focus {
            Focus::Pets => self.highlighted_pet().map(|p| DeleteTarget::Pet {
                id: p.id,
                name: p.name.clone(),
            }),
            Focus::Cares => {
                let pet_id = self.selected_pet.as_ref().map(|p| p.id);
                self.highlighted_care().and_then(|c| {
                    pet_id.map(|pet_id| DeleteTarget::Care { pet_id, care_id: c.id })
                })
            }
        };
        if let Some(target) = target {
            self.delete_target = Some(target);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(target) = self.delete_target.take() else {
            self.state = AppState::Browsing;
            return;
        };
        self.state = AppState::Browsing;

        let cache = Arc::clone(&self.cache);
        let tx = self.task_tx.clone();
        match target {
            DeleteTarget::Pet { id, .. } => {
                tokio::spawn(async move {
                    let result = cache.delete_pet_and_refresh(id).await;
                    let _ = tx.send(TaskResult::PetDeleted(id, result)).await;
                });
            }
            DeleteTarget::Care { pet_id, care_id } => {
                tokio::spawn(async move {
                    let result = cache.delete_care_and_refresh(pet_id, care_id).await;
                    let _ = tx.send(TaskResult::CareDeleted(pet_id, result)).await;
                });
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
        self.state = AppState::Browsing;
    }

    // =========================================================================
    // Background task processing
    // =========================================================================

    /// Drain completed background tasks; called once per loop tick.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Pets(Ok(pets)) => {
                self.pets = pets;
                self.pets_loading = false;
                self.pets_error = None;
                if self.pet_selection >= self.pets.len() {
                    self.pet_selection = self.pets.len().saturating_sub(1);
                }
                // Close the cares pane if its pet is gone from the list
                if let Some(ref selected) = self.selected_pet {
                    if !self.pets.iter().any(|p| p.id == selected.id) {
                        self.selected_pet = None;
                        self.cares.clear();
                        self.focus = Focus::Pets;
                    }
                }
            }
            TaskResult::Pets(Err(e)) => {
                error!(error = %e, "Failed to load pets");
                self.pets_loading = false;
                self.pets_error = Some(e.to_string());
                self.show_toast(e.to_string(), ToastKind::Error);
            }
            TaskResult::Cares(pet_id, Ok(cares)) => {
                if self.selected_pet.as_ref().is_some_and(|p| p.id == pet_id) {
                    self.cares = cares;
                    self.cares_loading = false;
                    self.cares_error = None;
                    if self.care_selection >= self.cares.len() {
                        self.care_selection = self.cares.len().saturating_sub(1);
                    }
                }
            }
            TaskResult::Cares(pet_id, Err(e)) => {
                error!(pet_id, error = %e, "Failed to load cares");
                if self.selected_pet.as_ref().is_some_and(|p| p.id == pet_id) {
                    self.cares_loading = false;
                    self.cares_error = Some(e.to_string());
                }
                self.show_toast(e.to_string(), ToastKind::Error);
            }
            TaskResult::PetCreated(Ok(pet)) => {
                info!(id = pet.id, "Pet created");
                self.pet_form = PetFormState::default();
                if self.state == AppState::AddingPet {
                    self.state = AppState::Browsing;
                }
                self.show_toast("Mascota creada", ToastKind::Success);
                self.load_pets();
            }
            TaskResult::PetCreated(Err(e)) => {
                error!(error = %e, "Failed to create pet");
                self.pet_form.submitting = false;
                self.show_toast("No se pudo crear la mascota", ToastKind::Error);
            }
            TaskResult::PetDeleted(id, Ok(())) => {
                info!(id, "Pet deleted");
                if self.selected_pet.as_ref().is_some_and(|p| p.id == id) {
                    self.selected_pet = None;
                    self.cares.clear();
                    self.focus = Focus::Pets;
                }
                self.show_toast("Mascota eliminada", ToastKind::Success);
                self.load_pets();
            }
            TaskResult::PetDeleted(id, Err(e)) => {
                error!(id, error = %e, "Failed to delete pet");
                self.show_toast(e.to_string(), ToastKind::Error);
            }
            TaskResult::CareCreated(pet_id, Ok(care)) => {
                info!(id = care.id, pet_id, "Care created");
                self.care_form = CareFormState::default();
                if self.state == AppState::AddingCare {
                    self.state = AppState::Browsing;
                }
                self.show_toast("Cuidado agregado", ToastKind::Success);
                if self.selected_pet.as_ref().is_some_and(|p| p.id == pet_id) {
                    self.load_cares(pet_id);
                }
            }
            TaskResult::CareCreated(pet_id, Err(e)) => {
                error!(pet_id, error = %e, "Failed to create care");
                self.care_form.submitting = false;
                self.show_toast(e.to_string(), ToastKind::Error);
            }
            TaskResult::CareDeleted(pet_id, Ok(())) => {
                info!(pet_id, "Care deleted");
                self.show_toast("Cuidado eliminado", ToastKind::Success);
                if self.selected_pet.as_ref().is_some_and(|p| p.id == pet_id) {
                    self.load_cares(pet_id);
                }
            }
            TaskResult::CareDeleted(pet_id, Err(e)) => {
                error!(pet_id, error = %e, "Failed to delete care");
                self.show_toast(e.to_string(), ToastKind::Error);
            }
        }
    }

    // =========================================================================
    // Toasts
    // =========================================================================

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            created: Instant::now(),
        });
    }

    /// Housekeeping run once per loop tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|t| now.duration_since(t.created) < TOAST_TTL);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_field_cycle_is_closed() {
        let mut field = PetField::Name;
        for _ in 0..5 {
            field = field.next();
        }
        assert_eq!(field, PetField::Name);
        assert_eq!(PetField::Name.prev(), PetField::Sex);
    }

    #[test]
    fn test_pet_form_birth_date_input_filtered() {
        let mut form = PetFormState::default();
        form.focus = PetField::BirthDate;
        for c in "2024-x01-15!".chars() {
            form.push_char(c);
        }
        assert_eq!(form.draft.birth_date, "2024-01-15");
        // Ten characters is the cap
        form.push_char('9');
        assert_eq!(form.draft.birth_date, "2024-01-15");
    }

    #[test]
    fn test_care_form_cycles_kind() {
        let mut form = CareFormState::default();
        assert_eq!(form.draft.kind, CareKind::Vaccination);
        form.cycle(true);
        assert_eq!(form.draft.kind, CareKind::Deworming);
        form.cycle(false);
        form.cycle(false);
        assert_eq!(form.draft.kind, CareKind::Bath);
    }
}
