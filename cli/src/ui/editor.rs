//! Editor overlay.
//!
//! A full-takeover form bound to one existing entity (edit) or to none
//! (create). Subcategory and product editors load the category list once on
//! entry; the product editor additionally loads the subcategories of the
//! chosen category, once per distinct choice.
//!
//! Saving is two-phase so the event loop can run the request in the
//! background: `begin_save` validates and marks the save in flight,
//! `SaveRequest::execute` talks to the store, and `finish_save` applies the
//! outcome.

use crate::catalog::{
    Catalog, CatalogError, Category, EntityId, EntityKind, FormPayload, ImageUpload, Prefill,
    Status, Subcategory,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Price,
    Category,
    Subcategory,
    Status,
    Image,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Price => "Price",
            Field::Category => "Category",
            Field::Subcategory => "Subcategory",
            Field::Status => "Status",
            Field::Image => "Image file",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Field::Name | Field::Price | Field::Image)
    }

    fn from_key(key: &str) -> Option<Field> {
        match key {
            "name" => Some(Field::Name),
            "price" => Some(Field::Price),
            "category" | "categoryId" => Some(Field::Category),
            "subcategory" | "subcategoryId" => Some(Field::Subcategory),
            "status" => Some(Field::Status),
            "image" => Some(Field::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveBlocked {
    InFlight,
    Invalid,
    /// No editor is open.
    Closed,
}

/// A validated save, detached from the editor so it can run in a task.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    kind: EntityKind,
    target: Option<EntityId>,
    form: FormPayload,
    image_path: Option<PathBuf>,
}

impl SaveRequest {
    pub async fn execute(self, catalog: &Catalog) -> Result<(), CatalogError> {
        let mut form = self.form;
        if let Some(path) = &self.image_path {
            let upload = ImageUpload::read(path).await.map_err(|e| {
                CatalogError::validation(
                    "image",
                    format!("Cannot read image {}: {}", path.display(), e),
                )
            })?;
            form = form.with_image(upload);
        }
        match &self.target {
            Some(id) => catalog.update(self.kind, id, &form).await,
            None => catalog.create(self.kind, &form).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Editor {
    kind: EntityKind,
    target: Option<EntityId>,
    name: String,
    price: String,
    status: Status,
    image_path: String,
    current_image: Option<String>,

    category: Option<EntityId>,
    // Owner name from records that do not carry the owner's id.
    category_hint: Option<String>,
    subcategory: Option<EntityId>,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    categories_requested: bool,
    categories_settled: bool,
    subcategories_for: Option<EntityId>,

    focus: usize,
    field_errors: Vec<(Field, String)>,
    error: Option<String>,
    saving: bool,
}

impl Editor {
    pub fn create(kind: EntityKind) -> Self {
        Editor {
            kind,
            target: None,
            name: String::new(),
            price: String::new(),
            status: Status::Active,
            image_path: String::new(),
            current_image: None,
            category: None,
            category_hint: None,
            subcategory: None,
            categories: Vec::new(),
            subcategories: Vec::new(),
            categories_requested: false,
            categories_settled: false,
            subcategories_for: None,
            focus: 0,
            field_errors: Vec::new(),
            error: None,
            saving: false,
        }
    }

    pub fn edit(kind: EntityKind, prefill: Prefill) -> Self {
        Editor {
            target: Some(prefill.id),
            name: prefill.name,
            price: prefill.price.unwrap_or_default(),
            status: prefill.status,
            current_image: prefill.image,
            category: prefill.category,
            category_hint: prefill.category_name,
            subcategory: prefill.subcategory,
            ..Editor::create(kind)
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn is_create(&self) -> bool {
        self.target.is_none()
    }

    pub fn title(&self) -> String {
        if self.is_create() {
            format!("Add {}", self.kind)
        } else {
            format!("Edit {}", self.kind)
        }
    }

    /// Fields shown for this kind; status only when editing.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Name];
        if self.kind == EntityKind::Product {
            fields.push(Field::Price);
        }
        if self.kind != EntityKind::Category {
            fields.push(Field::Category);
        }
        if self.kind == EntityKind::Product {
            fields.push(Field::Subcategory);
        }
        if !self.is_create() {
            fields.push(Field::Status);
        }
        fields.push(Field::Image);
        fields
    }

    pub fn focused(&self) -> Field {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Price => self.price.clone(),
            Field::Image => self.image_path.clone(),
            Field::Status => self.status.as_str().to_string(),
            Field::Category => self
                .chosen_category()
                .map(|c| c.name.clone())
                .or_else(|| self.category.as_ref().map(EntityId::to_string))
                .unwrap_or_default(),
            Field::Subcategory => self
                .subcategory
                .as_ref()
                .map(|id| {
                    self.subcategories
                        .iter()
                        .find(|s| &s.id == id)
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| id.to_string())
                })
                .unwrap_or_default(),
        }
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn current_image(&self) -> Option<&str> {
        self.current_image.as_deref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }

    pub fn selected_category(&self) -> Option<&EntityId> {
        self.category.as_ref()
    }

    pub fn selected_subcategory(&self) -> Option<&EntityId> {
        self.subcategory.as_ref()
    }

    fn chosen_category(&self) -> Option<&Category> {
        let id = self.category.as_ref()?;
        self.categories.iter().find(|c| &c.id == id)
    }

    fn clear_error(&mut self, field: Field) {
        self.field_errors.retain(|(f, _)| *f != field);
    }

    // Input

    pub fn input_char(&mut self, c: char) {
        let field = self.focused();
        match field {
            Field::Name => self.name.push(c),
            Field::Price => self.price.push(c),
            Field::Image => self.image_path.push(c),
            _ => return,
        }
        self.clear_error(field);
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        match field {
            Field::Name => self.name.pop(),
            Field::Price => self.price.pop(),
            Field::Image => self.image_path.pop(),
            _ => return,
        };
        self.clear_error(field);
    }

    /// Step through the options of the focused selector.
    pub fn cycle(&mut self, forward: bool) {
        match self.focused() {
            Field::Status => self.status = self.status.toggled(),
            Field::Category => {
                let ids: Vec<EntityId> = self.categories.iter().map(|c| c.id.clone()).collect();
                if let Some(id) = step(&ids, self.category.as_ref(), forward) {
                    self.select_category(id);
                }
            }
            Field::Subcategory => {
                let ids: Vec<EntityId> =
                    self.subcategories.iter().map(|s| s.id.clone()).collect();
                if let Some(id) = step(&ids, self.subcategory.as_ref(), forward) {
                    self.select_subcategory(id);
                }
            }
            _ => {}
        }
    }

    /// Choosing a different category drops the subcategory picked under the
    /// previous one along with the stale option list.
    pub fn select_category(&mut self, id: EntityId) {
        if self.category.as_ref() == Some(&id) {
            return;
        }
        self.category = Some(id);
        self.category_hint = None;
        if self.kind == EntityKind::Product {
            self.subcategory = None;
            self.subcategories.clear();
        }
        self.clear_error(Field::Category);
        self.clear_error(Field::Subcategory);
    }

    pub fn select_subcategory(&mut self, id: EntityId) {
        self.subcategory = Some(id);
        self.clear_error(Field::Subcategory);
    }

    // Dependent selectors

    /// True exactly once for editors that need the category list.
    pub fn needs_categories(&mut self) -> bool {
        if self.kind == EntityKind::Category || self.categories_requested {
            return false;
        }
        self.categories_requested = true;
        true
    }

    pub fn apply_categories(&mut self, result: Result<Vec<Category>, CatalogError>) {
        self.categories_settled = true;
        match result {
            Ok(categories) => {
                self.categories = categories;
                // Records may name their owner instead of carrying its id.
                let by_name = |key: &str| {
                    self.categories
                        .iter()
                        .find(|c| c.name == key)
                        .map(|c| c.id.clone())
                };
                let resolved = match (&self.category, &self.category_hint) {
                    (Some(id), _) if self.chosen_category().is_none() => by_name(id.as_str()),
                    (None, Some(hint)) => by_name(hint),
                    _ => None,
                };
                if let Some(id) = resolved {
                    self.category = Some(id);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load categories for editor");
                self.error = Some(format!("Could not load categories: {}", e));
            }
        }
    }

    /// The category whose subcategories should be fetched now, if the
    /// selection changed since the last fetch.
    pub fn pending_subcategory_fetch(&mut self) -> Option<EntityId> {
        if self.kind != EntityKind::Product || !self.categories_settled {
            return None;
        }
        let category = self.category.clone()?;
        if self.subcategories_for.as_ref() == Some(&category) {
            return None;
        }
        self.subcategories_for = Some(category.clone());
        Some(category)
    }

    pub fn apply_subcategories(
        &mut self,
        category: &EntityId,
        result: Result<Vec<Subcategory>, CatalogError>,
    ) {
        if self.category.as_ref() != Some(category) {
            return;
        }
        match result {
            Ok(subcategories) => {
                self.subcategories = match self.chosen_category() {
                    Some(owner) => subcategories
                        .into_iter()
                        .filter(|s| s.belongs_to(owner))
                        .collect(),
                    None => subcategories,
                };
                let resolved = self.subcategory.as_ref().and_then(|chosen| {
                    if self.subcategories.iter().any(|s| &s.id == chosen) {
                        return None;
                    }
                    self.subcategories
                        .iter()
                        .find(|s| s.name == chosen.as_str())
                        .map(|s| s.id.clone())
                });
                if let Some(id) = resolved {
                    self.subcategory = Some(id);
                }
            }
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "failed to load subcategories");
                self.error = Some(format!("Could not load subcategories: {}", e));
            }
        }
    }

    // Saving

    pub fn validate(&self) -> Result<(), Vec<(Field, String)>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push((Field::Name, format!("Please enter a {} name.", self.kind.path())));
        }
        if self.kind != EntityKind::Category {
            match &self.category {
                None => errors.push((Field::Category, "Please select a category.".to_string())),
                Some(_) if !self.categories.is_empty() && self.chosen_category().is_none() => {
                    errors.push((
                        Field::Category,
                        "The selected category no longer exists.".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }
        if self.kind == EntityKind::Product && self.subcategory.is_none() {
            errors.push((
                Field::Subcategory,
                "Please select a subcategory.".to_string(),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fields to submit. The image never comes from the previous value.
    pub fn form_payload(&self) -> FormPayload {
        let mut form = FormPayload::new().field("name", self.name.trim());
        let category = self.category.as_ref().map(EntityId::to_string);

        match self.kind {
            EntityKind::Category => {}
            EntityKind::Subcategory => {
                if let Some(id) = category {
                    form = form.field("categoryId", id);
                }
                if let Some(owner) = self.chosen_category() {
                    form = form.field("categoryName", owner.name.clone());
                }
            }
            EntityKind::Product => {
                if !self.price.trim().is_empty() {
                    form = form.field("price", self.price.trim());
                }
                if let Some(id) = category {
                    form = form.field("categoryId", id);
                }
                if let Some(id) = &self.subcategory {
                    form = form.field("subcategoryId", id.to_string());
                }
            }
        }
        if !self.is_create() {
            form = form.field("status", self.status.as_str());
        }
        form
    }

    pub fn begin_save(&mut self) -> Result<SaveRequest, SaveBlocked> {
        if self.saving {
            return Err(SaveBlocked::InFlight);
        }
        self.error = None;
        if let Err(errors) = self.validate() {
            self.field_errors = errors;
            return Err(SaveBlocked::Invalid);
        }
        self.field_errors.clear();
        self.saving = true;

        let image_path = Some(self.image_path.trim())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Ok(SaveRequest {
            kind: self.kind,
            target: self.target.clone(),
            form: self.form_payload(),
            image_path,
        })
    }

    /// Returns true when the save went through and the overlay can close.
    pub fn finish_save(&mut self, result: Result<(), CatalogError>) -> bool {
        self.saving = false;
        match result {
            Ok(()) => true,
            Err(CatalogError::Validation { field, message }) => {
                match Field::from_key(&field).filter(|f| self.fields().contains(f)) {
                    Some(f) => {
                        self.clear_error(f);
                        self.field_errors.push((f, message));
                    }
                    None => self.error = Some(message),
                }
                false
            }
            Err(e) => {
                tracing::warn!(kind = self.kind.path(), error = %e, "save failed");
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

fn step(ids: &[EntityId], current: Option<&EntityId>, forward: bool) -> Option<EntityId> {
    if ids.is_empty() {
        return None;
    }
    let len = ids.len();
    let next = match current.and_then(|c| ids.iter().position(|id| id == c)) {
        None if forward => 0,
        None => len - 1,
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
    };
    Some(ids[next].clone())
}
