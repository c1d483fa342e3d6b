use iced::keyboard::{self, Key, Modifiers};
use iced::widget::{
    button, column, container, horizontal_space, mouse_area, opaque, row, scrollable, text,
    text_input, Space, Stack,
};
use iced::{
    alignment, event, mouse, window, Alignment, Background, Color, Element, Event, Length,
    Padding, Point, Subscription, Task, Theme,
};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};

use purple_drive::controller::{AuthState, Snapshot};
use purple_drive::dispatch::{self, Command, DriveHandle, DropBatch};
use purple_drive::notify::{Notice, NoticeLevel};
use purple_drive::render::{ContextMenu, FileCard, MenuAction};
use purple_drive::view::{Section, ViewMode};
use purple_drive::{Confirmation, Drive, DriveConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Cards per row in grid mode
const GRID_COLUMNS: usize = 4;

/// Quiet period that ends one drag-and-drop gesture
const DROP_SETTLE: Duration = Duration::from_millis(150);

/// Purple-on-midnight palette
#[derive(Debug, Clone, Copy)]
struct Palette {
    bg_base: Color,
    bg_surface: Color,
    bg_elevated: Color,
    bg_hover: Color,
    bg_selected: Color,

    text_primary: Color,
    text_secondary: Color,
    text_disabled: Color,

    accent: Color,
    accent_hover: Color,
    accent_pressed: Color,

    border: Color,

    success: Color,
    error: Color,
}

impl Palette {
    fn purple() -> Self {
        Self {
            bg_base: Color::from_rgb8(10, 10, 20),
            bg_surface: Color::from_rgba8(20, 20, 35, 0.95),
            bg_elevated: Color::from_rgb8(30, 26, 50),
            bg_hover: Color::from_rgb8(44, 36, 74),
            bg_selected: Color::from_rgb8(58, 42, 110),

            text_primary: Color::from_rgb8(224, 209, 255), // #e0d1ff
            text_secondary: Color::from_rgb8(172, 139, 255),
            text_disabled: Color::from_rgb8(110, 96, 150),

            accent: Color::from_rgb8(106, 68, 255),
            accent_hover: Color::from_rgb8(128, 96, 255),
            accent_pressed: Color::from_rgb8(86, 52, 220),

            border: Color::from_rgba8(106, 68, 255, 0.3),

            success: Color::from_rgb8(88, 200, 140),
            error: Color::from_rgb8(255, 68, 68), // #ff4444
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("purple_drive=info,purple_drive_gui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let config = DriveConfig::from_env()?;
    let drive = Drive::new(&config)?;

    // The dispatcher lives on its own runtime for the lifetime of the window.
    let runtime = tokio::runtime::Runtime::new()?;
    let (handle, _dispatcher) = {
        let _guard = runtime.enter();
        dispatch::spawn(drive)
    };

    iced::application("Purple Drive", DriveGui::update, DriveGui::view)
        .theme(DriveGui::theme)
        .subscription(DriveGui::subscription)
        .window_size((1100.0, 720.0))
        .run_with(move || DriveGui::new(handle))?;

    Ok(())
}

struct DriveGui {
    handle: DriveHandle,
    snapshot: Snapshot,
    username: String,
    password: String,
    search: String,
    cursor: Point,
    drag_hover: bool,
    /// The OS reports one event per dropped file.
    dropped: DropBatch,
}

#[derive(Debug, Clone)]
enum Message {
    Synced(Snapshot),
    UsernameChanged(String),
    PasswordChanged(String),
    LoginPressed,
    CloseLoginPressed,
    AvatarPressed,
    AvatarAnswered(bool),
    RefreshPressed,
    UploadPressed,
    FilesPicked(Option<Vec<PathBuf>>),
    FileDropped(PathBuf),
    DropSettled(u64),
    DragHover(bool),
    SearchChanged(String),
    SectionSelected(Section),
    ViewModeSelected(ViewMode),
    CardPressed(String),
    CardRightPressed(String),
    CursorMoved(Point),
    MenuPicked(MenuAction),
    HideContextMenu,
    DownloadTarget(String, Option<PathBuf>),
    DeleteAnswered(String, bool),
    KeyboardEvent(Key, Modifiers),
}

impl DriveGui {
    fn new(handle: DriveHandle) -> (Self, Task<Message>) {
        let snapshot = handle.snapshot();
        (
            Self {
                handle,
                search: snapshot.search.clone(),
                snapshot,
                username: String::new(),
                password: String::new(),
                cursor: Point::ORIGIN,
                drag_hover: false,
                dropped: DropBatch::default(),
            },
            Task::none(),
        )
    }

    fn theme(&self) -> Theme {
        let colors = Palette::purple();
        Theme::custom(
            "Purple Drive".to_string(),
            iced::theme::Palette {
                background: colors.bg_base,
                text: colors.text_primary,
                primary: colors.accent,
                success: colors.success,
                danger: colors.error,
            },
        )
    }

    fn is_signed_in(&self) -> bool {
        self.snapshot.auth == AuthState::Authenticated
    }

    fn dispatch(&self, command: Command) -> Task<Message> {
        if !self.handle.send(command) {
            tracing::error!("Command queue is closed");
        }
        Task::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let snapshots =
            Subscription::run_with_id("drive-snapshots", snapshot_stream(self.handle.subscribe()));

        let window_events = event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            Event::Window(window::Event::FileHovered(_)) => Some(Message::DragHover(true)),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::DragHover(false)),
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                Some(Message::CursorMoved(position))
            }
            _ => None,
        });

        let keyboard_sub =
            keyboard::on_key_press(|key, modifiers| Some(Message::KeyboardEvent(key, modifiers)));

        Subscription::batch([snapshots, window_events, keyboard_sub])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Synced(snapshot) => {
                if snapshot.auth != self.snapshot.auth {
                    self.password.clear();
                    self.search = snapshot.search.clone();
                }
                self.snapshot = snapshot;
                Task::none()
            }
            Message::UsernameChanged(v) => {
                self.username = v;
                Task::none()
            }
            Message::PasswordChanged(v) => {
                self.password = v;
                Task::none()
            }
            Message::LoginPressed => self.dispatch(Command::Login {
                username: self.username.clone(),
                password: self.password.clone(),
            }),
            Message::CloseLoginPressed => self.dispatch(Command::CloseLogin),
            Message::AvatarPressed => {
                if self.is_signed_in() {
                    Task::perform(confirm("Do you want to sign out?"), Message::AvatarAnswered)
                } else {
                    self.dispatch(Command::AvatarClicked(Confirmation::Declined))
                }
            }
            Message::AvatarAnswered(yes) => {
                self.dispatch(Command::AvatarClicked(Confirmation::from(yes)))
            }
            Message::RefreshPressed => self.dispatch(Command::Refresh),
            Message::UploadPressed => Task::perform(
                async {
                    AsyncFileDialog::new()
                        .pick_files()
                        .await
                        .map(|h| h.into_iter().map(|f| f.path().to_path_buf()).collect())
                },
                Message::FilesPicked,
            ),
            Message::FilesPicked(picked) => match picked {
                Some(paths) if !paths.is_empty() => self.dispatch(Command::Upload(paths)),
                _ => Task::none(),
            },
            Message::FileDropped(path) => {
                self.drag_hover = false;
                let generation = self.dropped.push(path);
                Task::perform(tokio::time::sleep(DROP_SETTLE), move |()| {
                    Message::DropSettled(generation)
                })
            }
            Message::DropSettled(generation) => {
                // A later file from the same drop restarted the wait.
                let Some(paths) = self.dropped.settle(generation) else {
                    return Task::none();
                };
                if self.is_signed_in() {
                    self.dispatch(Command::Upload(paths))
                } else {
                    self.dispatch(Command::ShowLogin)
                }
            }
            Message::DragHover(hovering) => {
                self.drag_hover = hovering;
                Task::none()
            }
            Message::SearchChanged(term) => {
                self.search = term.clone();
                self.dispatch(Command::Search(term))
            }
            Message::SectionSelected(section) => self.dispatch(Command::SelectSection(section)),
            Message::ViewModeSelected(mode) => self.dispatch(Command::SetViewMode(mode)),
            Message::CardPressed(id) => self.dispatch(Command::OpenFile(id)),
            Message::CardRightPressed(id) => self.dispatch(Command::ShowContextMenu {
                id,
                position: (self.cursor.x, self.cursor.y),
            }),
            Message::CursorMoved(position) => {
                self.cursor = position;
                Task::none()
            }
            Message::MenuPicked(action) => {
                let Some(menu) = self.snapshot.context_menu.clone() else {
                    return Task::none();
                };
                let _ = self.dispatch(Command::HideContextMenu);
                let id = menu.file_id;
                match action {
                    MenuAction::Download => {
                        let name = menu.file_name;
                        Task::perform(
                            async move {
                                AsyncFileDialog::new()
                                    .set_file_name(name)
                                    .save_file()
                                    .await
                                    .map(|h| h.path().to_path_buf())
                            },
                            move |dest| Message::DownloadTarget(id.clone(), dest),
                        )
                    }
                    MenuAction::Delete => Task::perform(
                        confirm("Are you sure you want to delete this file?"),
                        move |yes| Message::DeleteAnswered(id.clone(), yes),
                    ),
                }
            }
            Message::HideContextMenu => self.dispatch(Command::HideContextMenu),
            Message::DownloadTarget(id, dest) => match dest {
                Some(destination) => self.dispatch(Command::Download { id, destination }),
                None => Task::none(),
            },
            Message::DeleteAnswered(id, yes) => self.dispatch(Command::Delete {
                id,
                confirmation: Confirmation::from(yes),
            }),
            Message::KeyboardEvent(key, modifiers) => {
                // Enter is handled by the password field's on_submit.
                if self.snapshot.login.open {
                    return match key {
                        Key::Named(keyboard::key::Named::Escape) => {
                            self.update(Message::CloseLoginPressed)
                        }
                        _ => Task::none(),
                    };
                }
                if !self.is_signed_in() {
                    return Task::none();
                }

                match key {
                    // Ctrl+R or F5: Refresh
                    Key::Character(c) if c.as_str() == "r" && modifiers.control() => {
                        self.update(Message::RefreshPressed)
                    }
                    Key::Named(keyboard::key::Named::F5) => self.update(Message::RefreshPressed),

                    // Ctrl+U: Upload files
                    Key::Character(c) if c.as_str() == "u" && modifiers.control() => {
                        self.update(Message::UploadPressed)
                    }

                    // Escape: close context menu
                    Key::Named(keyboard::key::Named::Escape) => {
                        self.update(Message::HideContextMenu)
                    }

                    _ => Task::none(),
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let colors = Palette::purple();

        let base = container(column![
            self.view_header(),
            row![self.view_sidebar(), self.view_files()].height(Length::Fill),
        ])
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_| container::Style {
            background: Some(colors.bg_base.into()),
            ..Default::default()
        });

        let mut layers: Vec<Element<'_, Message>> = vec![base.into()];

        if let Some(menu) = &self.snapshot.context_menu {
            layers.push(backdrop(Color::TRANSPARENT, Message::HideContextMenu));
            layers.push(self.view_context_menu(menu));
        }

        if self.snapshot.login.open {
            layers.push(backdrop(
                Color::from_rgba(0.0, 0.0, 0.0, 0.6),
                Message::CloseLoginPressed,
            ));
            layers.push(
                container(opaque(self.view_login()))
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .into(),
            );
        }

        if !self.snapshot.notices.is_empty() {
            layers.push(self.view_notices());
        }

        Stack::with_children(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_header(&self) -> Element<'_, Message> {
        let colors = Palette::purple();
        let mode = self.snapshot.grid.mode;

        let avatar = button(
            text(self.snapshot.avatar.to_string())
                .size(16)
                .align_x(alignment::Horizontal::Center),
        )
        .width(36)
        .padding([6, 0])
        .style(make_avatar_style(colors))
        .on_press(Message::AvatarPressed);

        let mut upload = button(text("⬆️ Upload").size(13))
            .padding([6, 12])
            .style(make_primary_style(colors));
        let mut refresh = button(text("🔄").size(13))
            .padding([6, 10])
            .style(make_secondary_style(colors));
        if self.is_signed_in() {
            upload = upload.on_press(Message::UploadPressed);
            refresh = refresh.on_press(Message::RefreshPressed);
        }

        container(
            row![
                text("☁️ Purple Drive").size(22).color(colors.text_secondary),
                Space::with_width(30),
                text_input("Search files...", &self.search)
                    .on_input(Message::SearchChanged)
                    .padding(8)
                    .size(13)
                    .width(Length::Fixed(280.0))
                    .style(make_input_style(colors)),
                horizontal_space(),
                button(text("▦").size(13))
                    .padding([6, 10])
                    .style(make_toggle_btn_style(colors, mode == ViewMode::Grid))
                    .on_press(Message::ViewModeSelected(ViewMode::Grid)),
                button(text("☰").size(13))
                    .padding([6, 10])
                    .style(make_toggle_btn_style(colors, mode == ViewMode::List))
                    .on_press(Message::ViewModeSelected(ViewMode::List)),
                Space::with_width(12),
                refresh,
                upload,
                Space::with_width(12),
                avatar,
            ]
            .spacing(6)
            .align_y(Alignment::Center),
        )
        .padding([12, 20])
        .width(Length::Fill)
        .style(move |_| container::Style {
            background: Some(colors.bg_surface.into()),
            border: iced::Border {
                color: colors.border,
                width: 1.0,
                ..Default::default()
            },
            ..Default::default()
        })
        .into()
    }

    fn view_sidebar(&self) -> Element<'_, Message> {
        let colors = Palette::purple();
        let items = Section::ALL.into_iter().map(|section| {
            button(text(section.label()).size(13))
                .width(Length::Fill)
                .padding([8, 12])
                .style(make_toggle_btn_style(colors, self.snapshot.section == section))
                .on_press(Message::SectionSelected(section))
                .into()
        });

        container(column(items).spacing(4).width(180))
            .padding(16)
            .height(Length::Fill)
            .style(move |_| container::Style {
                background: Some(colors.bg_surface.into()),
                ..Default::default()
            })
            .into()
    }

    fn view_files(&self) -> Element<'_, Message> {
        let grid = &self.snapshot.grid;
        if grid.show_upload_zone {
            return self.view_upload_zone();
        }

        let content: Element<'_, Message> = match grid.mode {
            ViewMode::Grid => {
                let rows = grid.cards.chunks(GRID_COLUMNS).map(|chunk| {
                    let mut cells: Vec<Element<'_, Message>> =
                        chunk.iter().map(|card| self.view_card(card)).collect();
                    while cells.len() < GRID_COLUMNS {
                        cells.push(Space::with_width(Length::FillPortion(1)).into());
                    }
                    row(cells).spacing(12).into()
                });
                column(rows).spacing(12).into()
            }
            ViewMode::List => column(grid.cards.iter().map(|card| self.view_list_row(card)))
                .spacing(2)
                .into(),
        };

        container(scrollable(content).height(Length::Fill))
            .padding(20)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_card<'a>(&'a self, card: &'a FileCard) -> Element<'a, Message> {
        let colors = Palette::purple();
        let selected = self.snapshot.selected.as_deref() == Some(card.id.as_str());

        let body = column![
            text(card.icon).size(36),
            text(card.name.as_str()).size(13).color(colors.text_primary),
            text(card.size.as_str()).size(11).color(colors.text_secondary),
            text(card.date.as_str()).size(11).color(colors.text_disabled),
        ]
        .spacing(4)
        .align_x(Alignment::Center)
        .width(Length::Fill);

        mouse_area(
            button(body)
                .width(Length::Fill)
                .padding(14)
                .style(make_file_item_style(colors, selected))
                .on_press(Message::CardPressed(card.id.clone())),
        )
        .on_right_press(Message::CardRightPressed(card.id.clone()))
        .into()
    }

    fn view_list_row<'a>(&'a self, card: &'a FileCard) -> Element<'a, Message> {
        let colors = Palette::purple();
        let selected = self.snapshot.selected.as_deref() == Some(card.id.as_str());

        let line = row![
            text(card.icon).size(16),
            Space::with_width(10),
            text(card.name.as_str()).size(13).color(colors.text_primary),
            horizontal_space(),
            text(card.size.as_str()).size(12).color(colors.text_secondary),
            Space::with_width(24),
            text(card.date.as_str()).size(12).color(colors.text_disabled),
        ]
        .align_y(Alignment::Center)
        .padding(8);

        mouse_area(
            button(line)
                .width(Length::Fill)
                .style(make_file_item_style(colors, selected))
                .on_press(Message::CardPressed(card.id.clone())),
        )
        .on_right_press(Message::CardRightPressed(card.id.clone()))
        .into()
    }

    fn view_upload_zone(&self) -> Element<'_, Message> {
        let colors = Palette::purple();
        let hovering = self.drag_hover;

        let body = column![
            text("📤").size(48),
            text("Drag and drop files here").size(16).color(colors.text_primary),
            text("or click to browse").size(12).color(colors.text_secondary),
        ]
        .spacing(8)
        .align_x(Alignment::Center);

        let mut zone = button(
            container(body)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .style(make_drop_zone_style(colors, hovering));
        if self.is_signed_in() {
            zone = zone.on_press(Message::UploadPressed);
        }

        container(zone).padding(40).into()
    }

    fn view_context_menu(&self, menu: &ContextMenu) -> Element<'_, Message> {
        let colors = Palette::purple();
        let (x, y) = menu.position;

        let mut items: Vec<Element<'_, Message>> = vec![text(menu.file_name.clone())
            .size(11)
            .color(colors.text_disabled)
            .into()];
        items.extend(menu.actions.iter().map(|action| {
            let danger = *action == MenuAction::Delete;
            button(text(action.label()).size(13))
                .width(Length::Fill)
                .padding([8, 12])
                .style(make_context_menu_item_style(colors, danger))
                .on_press(Message::MenuPicked(*action))
                .into()
        }));

        let panel = container(column(items).spacing(2).width(160))
            .padding(8)
            .style(move |_| container::Style {
                background: Some(colors.bg_surface.into()),
                border: iced::Border {
                    color: colors.border,
                    width: 1.0,
                    radius: 8.0.into(),
                },
                shadow: iced::Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.4),
                    offset: iced::Vector::new(2.0, 2.0),
                    blur_radius: 8.0,
                },
                ..Default::default()
            });

        container(opaque(panel))
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(Padding {
                top: y,
                right: 0.0,
                bottom: 0.0,
                left: x,
            })
            .into()
    }

    fn view_login(&self) -> Element<'_, Message> {
        let colors = Palette::purple();

        let error: Element<'_, Message> = match &self.snapshot.login.error {
            Some(e) => container(text(e.as_str()).size(12).color(Color::WHITE))
                .padding([6, 10])
                .width(Length::Fill)
                .style(move |_| notice_style(colors, NoticeLevel::Error))
                .into(),
            None => Space::with_height(0).into(),
        };

        container(
            column![
                row![
                    text("Sign in").size(20).color(colors.text_primary),
                    horizontal_space(),
                    button(text("✕").size(12))
                        .padding([2, 8])
                        .style(make_secondary_style(colors))
                        .on_press(Message::CloseLoginPressed),
                ]
                .align_y(Alignment::Center),
                Space::with_height(10),
                text_input("Username", &self.username)
                    .on_input(Message::UsernameChanged)
                    .padding(10)
                    .style(make_input_style(colors)),
                text_input("Password", &self.password)
                    .on_input(Message::PasswordChanged)
                    .on_submit(Message::LoginPressed)
                    .padding(10)
                    .secure(true)
                    .style(make_input_style(colors)),
                error,
                Space::with_height(10),
                button(text("Login").align_x(alignment::Horizontal::Center))
                    .on_press(Message::LoginPressed)
                    .width(Length::Fill)
                    .padding(10)
                    .style(make_primary_style(colors)),
            ]
            .spacing(10)
            .padding(24)
            .width(340),
        )
        .style(move |_| container::Style {
            background: Some(colors.bg_surface.into()),
            border: iced::Border {
                color: colors.border,
                width: 1.0,
                radius: 12.0.into(),
            },
            shadow: iced::Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
                offset: iced::Vector::new(0.0, 6.0),
                blur_radius: 18.0,
            },
            ..Default::default()
        })
        .into()
    }

    fn view_notices(&self) -> Element<'_, Message> {
        let colors = Palette::purple();
        let items = self.snapshot.notices.iter().map(|notice: &Notice| {
            let level = notice.level;
            container(text(notice.message.as_str()).size(13).color(Color::WHITE))
                .padding([10, 14])
                .width(Length::Fill)
                .style(move |_| notice_style(colors, level))
                .into()
        });

        container(column(items).spacing(8).width(320))
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .align_x(alignment::Horizontal::Right)
            .align_y(alignment::Vertical::Bottom)
            .into()
    }
}

/// Turns snapshot publications into messages.
fn snapshot_stream(
    mut snapshots: watch::Receiver<Snapshot>,
) -> impl futures::Stream<Item = Message> {
    async_stream::stream! {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            yield Message::Synced(snapshot);
        }
    }
}

/// Native yes/no dialog.
async fn confirm(description: &'static str) -> bool {
    let answer = AsyncMessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Purple Drive")
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show()
        .await;
    matches!(answer, MessageDialogResult::Yes)
}

/// Full-window click catcher beneath an overlay.
fn backdrop<'a>(tint: Color, on_press: Message) -> Element<'a, Message> {
    mouse_area(
        container(Space::new(Length::Fill, Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_| container::Style {
                background: Some(tint.into()),
                ..Default::default()
            }),
    )
    .on_press(on_press)
    .into()
}

// ============================================================================
// Style functions
// ============================================================================

fn notice_style(colors: Palette, level: NoticeLevel) -> container::Style {
    let background = match level {
        NoticeLevel::Info => colors.accent,
        NoticeLevel::Success => colors.success,
        NoticeLevel::Error => colors.error,
    };
    container::Style {
        background: Some(background.into()),
        border: iced::Border {
            radius: 6.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates a style function for text inputs
fn make_input_style(colors: Palette) -> impl Fn(&Theme, text_input::Status) -> text_input::Style {
    move |_, _| text_input::Style {
        background: Background::Color(colors.bg_elevated),
        border: iced::Border {
            color: colors.border,
            width: 1.0,
            radius: 6.0.into(),
        },
        icon: colors.text_primary,
        placeholder: colors.text_disabled,
        value: colors.text_primary,
        selection: colors.accent,
    }
}

/// Creates a style function for primary buttons (accent colored)
fn make_primary_style(colors: Palette) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_, s| {
        let base = button::Style {
            background: Some(colors.accent.into()),
            text_color: Color::WHITE,
            border: iced::Border {
                radius: 6.0.into(),
                ..Default::default()
            },
            ..Default::default()
        };
        match s {
            button::Status::Hovered => button::Style {
                background: Some(colors.accent_hover.into()),
                ..base
            },
            button::Status::Pressed => button::Style {
                background: Some(colors.accent_pressed.into()),
                ..base
            },
            button::Status::Disabled => button::Style {
                background: Some(colors.bg_elevated.into()),
                text_color: colors.text_disabled,
                ..base
            },
            button::Status::Active => base,
        }
    }
}

/// Creates a style function for secondary buttons
fn make_secondary_style(colors: Palette) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_, s| {
        let base = button::Style {
            background: Some(colors.bg_elevated.into()),
            text_color: colors.text_primary,
            border: iced::Border {
                color: colors.border,
                width: 1.0,
                radius: 6.0.into(),
            },
            ..Default::default()
        };
        match s {
            button::Status::Hovered => button::Style {
                background: Some(colors.bg_hover.into()),
                ..base
            },
            button::Status::Pressed => button::Style {
                background: Some(colors.bg_selected.into()),
                ..base
            },
            _ => base,
        }
    }
}

/// Creates a style function for toggle buttons (view mode, sidebar)
fn make_toggle_btn_style(
    colors: Palette,
    is_active: bool,
) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_, s| {
        let base = if is_active {
            button::Style {
                background: Some(colors.bg_selected.into()),
                text_color: colors.text_primary,
                border: iced::Border {
                    color: colors.accent,
                    width: 1.0,
                    radius: 6.0.into(),
                },
                ..Default::default()
            }
        } else {
            button::Style {
                background: Some(Color::TRANSPARENT.into()),
                text_color: colors.text_secondary,
                border: iced::Border {
                    radius: 6.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        };
        match s {
            button::Status::Hovered if !is_active => button::Style {
                background: Some(colors.bg_hover.into()),
                ..base
            },
            _ => base,
        }
    }
}

/// Creates a style function for file cards and list rows
fn make_file_item_style(
    colors: Palette,
    is_selected: bool,
) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_, s| {
        let background = match (is_selected, s) {
            (true, _) => colors.bg_selected,
            (false, button::Status::Hovered) => colors.bg_hover,
            (false, _) => colors.bg_elevated,
        };
        button::Style {
            background: Some(background.into()),
            text_color: colors.text_primary,
            border: iced::Border {
                color: if is_selected { colors.accent } else { colors.border },
                width: 1.0,
                radius: 10.0.into(),
            },
            ..Default::default()
        }
    }
}

/// Creates a style function for context menu entries
fn make_context_menu_item_style(
    colors: Palette,
    is_danger: bool,
) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_, s| {
        let text_color = if is_danger {
            colors.error
        } else {
            colors.text_primary
        };
        let background = match s {
            button::Status::Hovered | button::Status::Pressed => colors.bg_hover,
            _ => Color::TRANSPARENT,
        };
        button::Style {
            background: Some(background.into()),
            text_color,
            border: iced::Border {
                radius: 4.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Creates a style function for the round avatar button
fn make_avatar_style(colors: Palette) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_, s| button::Style {
        background: Some(
            match s {
                button::Status::Hovered => colors.accent_hover,
                _ => colors.accent,
            }
            .into(),
        ),
        text_color: Color::WHITE,
        border: iced::Border {
            radius: 18.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates a style function for the upload drop zone
fn make_drop_zone_style(
    colors: Palette,
    is_hovering: bool,
) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_, s| {
        let highlighted = is_hovering || matches!(s, button::Status::Hovered);
        button::Style {
            background: Some(
                if highlighted {
                    colors.bg_hover
                } else {
                    colors.bg_surface
                }
                .into(),
            ),
            text_color: colors.text_primary,
            border: iced::Border {
                color: if highlighted { colors.accent } else { colors.border },
                width: 2.0,
                radius: 16.0.into(),
            },
            ..Default::default()
        }
    }
}
