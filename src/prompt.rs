use std::io::{self, BufRead, Write};

/// What the user said about one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Good,
    Spam,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Collection,
    Prediction,
}

/// The human side of the collector.
pub trait Prompt {
    fn ask_mode(&mut self) -> io::Result<Mode>;

    fn ask_label(&mut self) -> io::Result<Response>;

    fn show(&mut self, line: &str) -> io::Result<()>;
}

/// Line-based prompt over any reader and writer, normally stdin and stdout.
/// End of input is taken as a request to exit.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        TerminalPrompt::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompt { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn choose<T: Copy>(
        &mut self,
        question: &str,
        retry: &str,
        choices: &[(&str, T)],
        eof: Option<T>,
    ) -> io::Result<T> {
        write!(self.output, "{}", question)?;
        loop {
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return eof.ok_or_else(|| {
                    io::Error::new(io::ErrorKind::UnexpectedEof, "no answer given")
                });
            }
            let answer = line.trim().to_lowercase();
            if let Some((_, value)) = choices.iter().find(|(key, _)| *key == answer) {
                return Ok(*value);
            }
            write!(self.output, "{}", retry)?;
        }
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn ask_mode(&mut self) -> io::Result<Mode> {
        self.choose(
            "Enter P for Prediction Mode, C for Collecting Mode: ",
            "Invalid input, try again (P or C): ",
            &[("p", Mode::Prediction), ("c", Mode::Collection)],
            None,
        )
    }

    fn ask_label(&mut self) -> io::Result<Response> {
        self.choose(
            "Enter 'G' for Good, 'S' for Spam, 'E' for Exit: ",
            "Invalid input, try again (G, S or E): ",
            &[("g", Response::Good), ("s", Response::Spam), ("e", Response::Exit)],
            Some(Response::Exit),
        )
    }

    fn show(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_retries_until_valid() {
        let mut prompt = TerminalPrompt::new(Cursor::new("x\n  G \n"), vec![]);
        assert_eq!(prompt.ask_label().unwrap(), Response::Good);
        let output = String::from_utf8(prompt.into_output()).unwrap();
        assert_eq!(
            output,
            "Enter 'G' for Good, 'S' for Spam, 'E' for Exit: \
             Invalid input, try again (G, S or E): "
        );
    }

    #[test]
    fn test_end_of_input() {
        let mut prompt = TerminalPrompt::new(Cursor::new("s\n"), vec![]);
        assert_eq!(prompt.ask_label().unwrap(), Response::Spam);
        assert_eq!(prompt.ask_label().unwrap(), Response::Exit);
        assert!(prompt.ask_mode().is_err());
    }

    #[test]
    fn test_mode() {
        let mut prompt = TerminalPrompt::new(Cursor::new("q\np\n"), vec![]);
        assert_eq!(prompt.ask_mode().unwrap(), Mode::Prediction);
    }
}
