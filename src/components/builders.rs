//! Buttons, select menus and modals
//!
//! Every interactive component is bound either to a flat-table handler by name
//! (`route`) or to a closure registered for the lifetime of the message it is
//! sent on (`on_click` / `on_select`).

use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;

use super::custom_id::{check_length, CustomId, SCOPED_PREFIX};
use super::handler::{inline_button, inline_values, ButtonFn, ComponentHandler, ModalFn, SelectFn};
use crate::core::RegistrationError;
use crate::interaction::InteractionContext;
use crate::wire::{WireComponent, WireEmoji, WireSelectOption};

pub const MAX_ROWS: usize = 5;
pub const MAX_ROW_BUTTONS: usize = 5;
pub const MAX_SELECT_OPTIONS: usize = 25;
pub const MAX_MODAL_INPUTS: usize = 5;
const MAX_INPUT_LABEL: usize = 45;

const BUTTON: u8 = 2;
const TEXT_INPUT: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEmoji {
    pub id: Option<String>,
    pub name: String,
    pub animated: bool,
}

impl ComponentEmoji {
    pub fn unicode(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            animated: false,
        }
    }

    pub fn custom(id: impl Into<String>, name: impl Into<String>, animated: bool) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            animated,
        }
    }

    fn to_wire(&self) -> WireEmoji {
        WireEmoji {
            id: self.id.clone(),
            name: self.name.clone(),
            animated: self.animated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
    Link,
}

impl ButtonStyle {
    pub fn code(self) -> u8 {
        match self {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
            ButtonStyle::Link => 5,
        }
    }
}

#[derive(Clone)]
enum ButtonAction {
    Route(CustomId),
    Inline(ButtonFn),
    Link(String),
    /// No handler; clicks are dropped
    Inert,
}

#[derive(Clone)]
pub struct Button {
    label: Option<String>,
    style: ButtonStyle,
    emoji: Option<ComponentEmoji>,
    disabled: bool,
    action: ButtonAction,
}

impl Button {
    pub fn new(label: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            label: Some(label.into()),
            style,
            emoji: None,
            disabled: false,
            action: ButtonAction::Inert,
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            action: ButtonAction::Link(url.into()),
            ..Self::new(label, ButtonStyle::Link)
        }
    }

    /// Dispatch clicks to the flat-table handler `handler`, passing `params`
    pub fn route(mut self, handler: impl Into<String>, params: impl Into<String>) -> Self {
        self.action = ButtonAction::Route(CustomId::new(handler, params));
        self
    }

    /// Dispatch clicks to `f` for as long as the message stays registered
    pub fn on_click<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.action = ButtonAction::Inline(inline_button(f));
        self
    }

    pub fn emoji(mut self, emoji: ComponentEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .field("style", &self.style)
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// Which entities a select menu offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKind {
    String,
    User,
    Role,
    Mentionable,
    Channel,
}

impl SelectKind {
    pub fn code(self) -> u8 {
        match self {
            SelectKind::String => 3,
            SelectKind::User => 5,
            SelectKind::Role => 6,
            SelectKind::Mentionable => 7,
            SelectKind::Channel => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
    pub emoji: Option<ComponentEmoji>,
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            default: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn emoji(mut self, emoji: ComponentEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn default_selected(mut self) -> Self {
        self.default = true;
        self
    }

    fn to_wire(&self) -> WireSelectOption {
        WireSelectOption {
            label: self.label.clone(),
            value: self.value.clone(),
            description: self.description.clone(),
            emoji: self.emoji.as_ref().map(ComponentEmoji::to_wire),
            default: self.default,
        }
    }
}

#[derive(Clone)]
enum SelectAction {
    Route(CustomId),
    Inline(SelectFn),
    Inert,
}

#[derive(Clone)]
pub struct Select {
    kind: SelectKind,
    placeholder: Option<String>,
    options: Vec<SelectOption>,
    min_values: Option<u8>,
    max_values: Option<u8>,
    channel_types: Vec<u8>,
    disabled: bool,
    action: SelectAction,
}

impl Select {
    /// String select; add entries with [`Select::option`]
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self::of_kind(SelectKind::String, placeholder)
    }

    pub fn of_kind(kind: SelectKind, placeholder: impl Into<String>) -> Self {
        Self {
            kind,
            placeholder: Some(placeholder.into()),
            options: Vec::new(),
            min_values: None,
            max_values: None,
            channel_types: Vec::new(),
            disabled: false,
            action: SelectAction::Inert,
        }
    }

    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn range(mut self, min: u8, max: u8) -> Self {
        self.min_values = Some(min);
        self.max_values = Some(max);
        self
    }

    /// Restrict a channel select to the given channel type codes
    pub fn channel_types(mut self, types: Vec<u8>) -> Self {
        self.channel_types = types;
        self
    }

    pub fn route(mut self, handler: impl Into<String>, params: impl Into<String>) -> Self {
        self.action = SelectAction::Route(CustomId::new(handler, params));
        self
    }

    pub fn on_select<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(InteractionContext, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.action = SelectAction::Inline(inline_values(f));
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    fn validate(&self) -> Result<(), RegistrationError> {
        match self.kind {
            SelectKind::String if self.options.is_empty() => {
                return Err(RegistrationError::Layout(
                    "string select needs at least one option".into(),
                ))
            }
            SelectKind::String if self.options.len() > MAX_SELECT_OPTIONS => {
                return Err(RegistrationError::Layout(format!(
                    "select has {} options, the limit is {MAX_SELECT_OPTIONS}",
                    self.options.len()
                )))
            }
            SelectKind::String => {}
            _ if !self.options.is_empty() => {
                return Err(RegistrationError::Layout(
                    "only string selects take explicit options".into(),
                ))
            }
            _ => {}
        }
        if !self.channel_types.is_empty() && self.kind != SelectKind::Channel {
            return Err(RegistrationError::Layout(
                "channel types apply to channel selects only".into(),
            ));
        }
        let min = self.min_values.unwrap_or(1);
        let max = self.max_values.unwrap_or(1);
        if min > max || max as usize > MAX_SELECT_OPTIONS {
            return Err(RegistrationError::Layout(format!(
                "invalid selection range {min}..={max}"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("kind", &self.kind)
            .field("placeholder", &self.placeholder)
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Component {
    Button(Button),
    Select(Select),
}

impl From<Button> for Component {
    fn from(button: Button) -> Self {
        Component::Button(button)
    }
}

impl From<Select> for Component {
    fn from(select: Select) -> Self {
        Component::Select(select)
    }
}

/// Wire rows plus the inline handles they need, keyed by local index
pub(crate) struct RenderedRows {
    pub rows: Vec<WireComponent>,
    pub inline: Vec<(String, ComponentHandler)>,
}

/// Lay out component rows, assigning `~<scope>|<index>` ids to inline handles
pub(crate) fn render_rows(
    rows: &[Vec<Component>],
    scope: &str,
) -> Result<RenderedRows, RegistrationError> {
    if rows.len() > MAX_ROWS {
        return Err(RegistrationError::Layout(format!(
            "{} rows, the limit is {MAX_ROWS}",
            rows.len()
        )));
    }

    let mut rendered = RenderedRows {
        rows: Vec::with_capacity(rows.len()),
        inline: Vec::new(),
    };
    let mut seen = HashSet::new();
    let mut index = 0usize;

    for row in rows {
        let selects = row
            .iter()
            .filter(|c| matches!(c, Component::Select(_)))
            .count();
        if row.is_empty() {
            return Err(RegistrationError::Layout("empty row".into()));
        }
        if selects > 0 && row.len() > 1 {
            return Err(RegistrationError::Layout(
                "a select menu must be alone in its row".into(),
            ));
        }
        if row.len() > MAX_ROW_BUTTONS {
            return Err(RegistrationError::Layout(format!(
                "{} buttons in one row, the limit is {MAX_ROW_BUTTONS}",
                row.len()
            )));
        }

        let mut wire_row = Vec::with_capacity(row.len());
        for component in row {
            let local = index.to_string();
            let scoped = CustomId::scoped(scope, index).encode();
            index += 1;

            let wire = match component {
                Component::Button(button) => {
                    let mut wire = WireComponent {
                        kind: BUTTON,
                        style: Some(button.style.code()),
                        label: button.label.clone(),
                        emoji: button.emoji.as_ref().map(ComponentEmoji::to_wire),
                        disabled: button.disabled,
                        ..WireComponent::default()
                    };
                    match &button.action {
                        ButtonAction::Link(url) => {
                            wire.style = Some(ButtonStyle::Link.code());
                            wire.url = Some(url.clone());
                        }
                        _ if button.style == ButtonStyle::Link => {
                            return Err(RegistrationError::Layout(
                                "link buttons need a url".into(),
                            ))
                        }
                        ButtonAction::Route(id) => wire.custom_id = Some(id.encode()),
                        ButtonAction::Inline(f) => {
                            rendered
                                .inline
                                .push((local, ComponentHandler::Button(f.clone())));
                            wire.custom_id = Some(scoped);
                        }
                        ButtonAction::Inert => wire.custom_id = Some(scoped),
                    }
                    wire
                }
                Component::Select(select) => {
                    select.validate()?;
                    let custom_id = match &select.action {
                        SelectAction::Route(id) => id.encode(),
                        SelectAction::Inline(f) => {
                            rendered
                                .inline
                                .push((local, ComponentHandler::Select(f.clone())));
                            scoped
                        }
                        SelectAction::Inert => scoped,
                    };
                    WireComponent {
                        kind: select.kind.code(),
                        custom_id: Some(custom_id),
                        placeholder: select.placeholder.clone(),
                        options: (select.kind == SelectKind::String)
                            .then(|| select.options.iter().map(SelectOption::to_wire).collect()),
                        channel_types: (!select.channel_types.is_empty())
                            .then(|| select.channel_types.clone()),
                        min_values: select.min_values,
                        max_values: select.max_values,
                        disabled: select.disabled,
                        ..WireComponent::default()
                    }
                }
            };

            if let Some(id) = &wire.custom_id {
                check_length(id)?;
                if !seen.insert(id.clone()) {
                    return Err(RegistrationError::DuplicateComponentId(id.clone()));
                }
            }
            wire_row.push(wire);
        }
        rendered.rows.push(WireComponent::action_row(wire_row));
    }
    Ok(rendered)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputStyle {
    Short,
    Paragraph,
}

impl TextInputStyle {
    fn code(self) -> u8 {
        match self {
            TextInputStyle::Short => 1,
            TextInputStyle::Paragraph => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalInput {
    pub label: String,
    pub style: TextInputStyle,
    pub placeholder: Option<String>,
    pub required: bool,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    /// Pre-filled text
    pub value: Option<String>,
}

impl ModalInput {
    pub fn new(label: impl Into<String>, style: TextInputStyle) -> Self {
        Self {
            label: label.into(),
            style,
            placeholder: None,
            required: true,
            min_length: None,
            max_length: None,
            value: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn length(mut self, min: u16, max: u16) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Clone)]
enum ModalAction {
    Route(CustomId),
    Inline(ModalFn),
}

/// A form shown in place of an initial response
#[derive(Clone)]
pub struct Modal {
    title: String,
    inputs: Vec<ModalInput>,
    action: ModalAction,
}

/// Wire form of a modal and the single-use handle it registers, if any
pub(crate) struct RenderedModal {
    pub custom_id: String,
    pub title: String,
    pub rows: Vec<WireComponent>,
    pub inline: Option<ModalFn>,
}

impl Modal {
    /// Modal answered by `f` with the field values in input order
    pub fn new<F, Fut>(title: impl Into<String>, f: F) -> Self
    where
        F: Fn(InteractionContext, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            title: title.into(),
            inputs: Vec::new(),
            action: ModalAction::Inline(inline_values(f)),
        }
    }

    /// Modal answered by the flat-table modal handler `handler`
    pub fn route(
        title: impl Into<String>,
        handler: impl Into<String>,
        params: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            inputs: Vec::new(),
            action: ModalAction::Route(CustomId::new(handler, params)),
        }
    }

    pub fn input(mut self, input: ModalInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub(crate) fn render(&self, interaction_id: &str) -> Result<RenderedModal, RegistrationError> {
        if self.inputs.is_empty() || self.inputs.len() > MAX_MODAL_INPUTS {
            return Err(RegistrationError::Layout(format!(
                "a modal takes 1-{MAX_MODAL_INPUTS} inputs, got {}",
                self.inputs.len()
            )));
        }
        if let Some(long) = self
            .inputs
            .iter()
            .find(|i| i.label.is_empty() || i.label.chars().count() > MAX_INPUT_LABEL)
        {
            return Err(RegistrationError::Layout(format!(
                "input label '{}' must be 1-{MAX_INPUT_LABEL} characters",
                long.label
            )));
        }

        let (custom_id, inline) = match &self.action {
            ModalAction::Route(id) => (id.encode(), None),
            ModalAction::Inline(f) => (format!("{SCOPED_PREFIX}{interaction_id}"), Some(f.clone())),
        };
        check_length(&custom_id)?;

        let rows = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                WireComponent::action_row(vec![WireComponent {
                    kind: TEXT_INPUT,
                    custom_id: Some(index.to_string()),
                    style: Some(input.style.code()),
                    label: Some(input.label.clone()),
                    placeholder: input.placeholder.clone(),
                    min_length: input.min_length,
                    max_length: input.max_length,
                    required: Some(input.required),
                    value: input.value.clone(),
                    ..WireComponent::default()
                }])
            })
            .collect();

        Ok(RenderedModal {
            custom_id,
            title: self.title.clone(),
            rows,
            inline,
        })
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("title", &self.title)
            .field("inputs", &self.inputs)
            .finish()
    }
}
