use vitrine_core::ipc::Command;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Show,
    Hide,
    Next,
    Previous,
    Face(usize),
    Slide(usize),
    Setup,
    ConfigReload,
}

impl From<Command> for AppEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::Show => AppEvent::Show,
            Command::Hide => AppEvent::Hide,
            Command::Next => AppEvent::Next,
            Command::Prev => AppEvent::Previous,
            Command::Face(i) => AppEvent::Face(i),
            Command::Slide(i) => AppEvent::Slide(i),
            Command::Setup => AppEvent::Setup,
        }
    }
}
