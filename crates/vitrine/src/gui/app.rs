use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::gui::dots::DotStrip;
use crate::gui::gallery::Gallery;
use crate::gui::theme;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::time::Instant;
use vitrine_core::{CubeNavigator, Heading, Rotation};

/// Discrete wheel notches are scaled to pixels so mice and touchpads share
/// one threshold.
const WHEEL_STEP_PIXELS: f64 = 100.0;

pub struct AppModel {
    pub config: Config,
    pub visible: bool,
    cube: Option<CubeNavigator>,
    gallery: Option<Gallery>,
    gallery_face: Option<usize>,
    stack: gtk::Stack,
    nav_dots: DotStrip,
}

#[derive(Debug)]
pub enum AppMsg {
    Show,
    Hide,
    Next,
    Previous,
    Face(usize),
    Slide(usize),
    Wheel(f64),
    Key(Heading),
    Setup,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show => AppMsg::Show,
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::Next => AppMsg::Next,
            AppEvent::Previous => AppMsg::Previous,
            AppEvent::Face(i) => AppMsg::Face(i),
            AppEvent::Slide(i) => AppMsg::Slide(i),
            AppEvent::Setup => AppMsg::Setup,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Vitrine"),
            set_default_size: (1024, 640),
            #[watch]
            set_visible: model.visible,
            add_css_class: "vitrine-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    let heading = match key {
                        gtk::gdk::Key::Up => Heading::Up,
                        gtk::gdk::Key::Down => Heading::Down,
                        _ => return glib::Propagation::Proceed,
                    };
                    sender.input(AppMsg::Key(heading));
                    glib::Propagation::Stop
                }
            },

            add_controller = gtk::EventControllerScroll {
                set_flags: gtk::EventControllerScrollFlags::VERTICAL,
                connect_scroll[sender] => move |controller, _, dy| {
                    let scale = if controller.unit() == gtk::gdk::ScrollUnit::Wheel {
                        WHEEL_STEP_PIXELS
                    } else {
                        1.0
                    };
                    sender.input(AppMsg::Wheel(dy * scale));
                    glib::Propagation::Stop
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,

                #[local_ref]
                stack -> gtk::Stack {
                    set_hexpand: true,
                    set_vexpand: true,
                },

                #[local_ref]
                nav_area -> gtk::DrawingArea {
                    set_vexpand: true,
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, rx) = init;

        theme::load_css();

        let stack = gtk::Stack::new();
        let nav_dots = {
            let sender = sender.clone();
            DotStrip::new(gtk::Orientation::Vertical, move |i| {
                sender.input(AppMsg::Face(i));
            })
        };
        let nav_area = nav_dots.area().clone();

        let mut model = AppModel {
            config,
            visible: true,
            cube: None,
            gallery: None,
            gallery_face: None,
            stack: stack.clone(),
            nav_dots,
        };
        model.rebuild();

        let widgets = view_output!();

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show => {
                self.visible = true;
            }
            AppMsg::Hide => {
                self.visible = false;
            }
            AppMsg::Next => self.turn(|cube| Some(cube.next())),
            AppMsg::Previous => self.turn(|cube| Some(cube.previous())),
            AppMsg::Face(i) => self.turn(|cube| Some(cube.rotate_to(i))),
            AppMsg::Key(heading) => self.turn(|cube| Some(cube.on_key(heading))),
            AppMsg::Wheel(dy) => self.turn(|cube| cube.on_wheel(dy, Instant::now())),
            AppMsg::Slide(i) => {
                if let Some(face) = self.gallery_face {
                    self.turn(|cube| (cube.current() != face).then(|| cube.rotate_to(face)));
                }
                match &self.gallery {
                    Some(gallery) => gallery.goto(i),
                    None => log::warn!("No gallery panel; ignoring slide {}", i),
                }
            }
            AppMsg::Setup => match config::write_default_config() {
                Ok(path) => {
                    if let Err(e) = std::process::Command::new("xdg-open").arg(&path).spawn() {
                        log::error!("Failed to open {}: {}", path.display(), e);
                    }
                }
                Err(e) => log::error!("Failed to write default config: {}", e),
            },
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.config = new_config;
                    self.rebuild();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn turn(&mut self, f: impl FnOnce(&mut CubeNavigator) -> Option<Rotation>) {
        let Some(cube) = self.cube.as_mut() else {
            return;
        };
        if let Some(rotation) = f(cube) {
            let transition = if rotation.steps >= 0 {
                gtk::StackTransitionType::SlideUp
            } else {
                gtk::StackTransitionType::SlideDown
            };
            self.show_face(rotation.index, transition);
        }
    }

    fn show_face(&self, index: usize, transition: gtk::StackTransitionType) {
        self.stack
            .set_visible_child_full(face_name(index).as_str(), transition);

        if let Some(cube) = &self.cube {
            for i in 0..cube.faces() {
                self.nav_dots.set_active(i, cube.is_active(i));
            }
        }

        if Some(index) == self.gallery_face
            && let Some(gallery) = &self.gallery
        {
            gallery.focus();
        }
    }

    /// Recreates every panel, the gallery and the navigator from `self.config`.
    fn rebuild(&mut self) {
        while let Some(child) = self.stack.first_child() {
            self.stack.remove(&child);
        }

        let settings = &self.config.cube;
        self.gallery_face = settings.gallery_index();
        self.gallery = None;

        for (i, title) in settings.faces.iter().enumerate() {
            let page: gtk::Widget = if Some(i) == self.gallery_face {
                let gallery = Gallery::new(&self.config.gallery);
                let root = gallery.root.clone().upcast();
                self.gallery = Some(gallery);
                root
            } else {
                face_page(title)
            };
            self.stack.add_named(&page, Some(face_name(i).as_str()));
        }

        self.stack
            .set_transition_duration(settings.cooldown_ms.min(u32::MAX as u64) as u32);
        self.nav_dots.reset(settings.faces.clone());

        self.cube = match CubeNavigator::new(settings.faces.len(), settings.cube_config()) {
            Ok(cube) => Some(cube),
            Err(e) => {
                log::error!("Panel navigator disabled: {}", e);
                None
            }
        };

        if let Some(cube) = &self.cube {
            self.show_face(cube.current(), gtk::StackTransitionType::None);
        }
    }
}

fn face_name(index: usize) -> String {
    format!("face-{}", index)
}

fn face_page(title: &str) -> gtk::Widget {
    let page = gtk::Box::new(gtk::Orientation::Vertical, 0);
    page.set_valign(gtk::Align::Center);
    page.set_halign(gtk::Align::Center);

    let label = gtk::Label::new(Some(title));
    label.add_css_class("vitrine-face-title");
    page.append(&label);

    page.upcast()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::ipc::Command;

    #[test]
    fn test_control_commands_map_to_messages() {
        let cases = vec![
            ("next", "Next"),
            ("prev", "Previous"),
            ("face 2", "Face(2)"),
            ("slide 4", "Slide(4)"),
            ("hide", "Hide"),
            ("setup", "Setup"),
        ];

        for (line, expected) in cases {
            let command: Command = line.parse().unwrap();
            let msg = AppMsg::from(AppEvent::from(command));
            assert_eq!(format!("{:?}", msg), expected);
        }
    }

    #[test]
    fn test_face_names_are_unique() {
        assert_eq!(face_name(0), "face-0");
        assert_ne!(face_name(1), face_name(11));
    }
}
