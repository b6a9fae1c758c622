use crate::layout_ir::{Line, Page};

/// Greedy page filler with a fixed vertical rhythm.
///
/// Every line costs `line_height`; a page closes when the next line would
/// push it past `content_height`. A page always accepts its first line, so a
/// budget smaller than one line still makes progress with one line per page.
#[derive(Clone, Debug)]
pub struct Paginator {
    line_height: f32,
    content_height: f32,
    pages: Vec<Page>,
    current: Page,
}

impl Paginator {
    pub fn new(line_height: f32, content_height: f32) -> Self {
        Self {
            line_height,
            content_height,
            pages: Vec::new(),
            current: Page::new(1),
        }
    }

    pub fn push(&mut self, line: Line) {
        let next_height = (self.current.lines.len() + 1) as f32 * self.line_height;
        if next_height > self.content_height && !self.current.lines.is_empty() {
            let next_number = self.current.page_number + 1;
            let full = core::mem::replace(&mut self.current, Page::new(next_number));
            self.pages.push(full);
        }
        self.current.lines.push(line);
    }

    /// Close the last page. An empty flow yields no pages.
    pub fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Paginate a complete line list.
pub fn paginate(lines: Vec<Line>, line_height: f32, content_height: f32) -> Vec<Page> {
    let mut paginator = Paginator::new(line_height, content_height);
    for line in lines {
        paginator.push(line);
    }
    paginator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_ir::LineAlignment;

    fn blank_lines(n: usize) -> Vec<Line> {
        (0..n)
            .map(|_| Line {
                tokens: Vec::new(),
                width: 0.0,
                alignment: LineAlignment::Left,
            })
            .collect()
    }

    #[test]
    fn fills_pages_up_to_budget() {
        let pages = paginate(blank_lines(10), 30.0, 100.0);
        let counts: Vec<usize> = pages.iter().map(Page::line_count).collect();
        assert_eq!(counts, vec![3, 3, 3, 1]);
        assert_eq!(
            pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn exact_fit_stays_on_page() {
        let pages = paginate(blank_lines(4), 25.0, 100.0);
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn tiny_budget_still_makes_progress() {
        let pages = paginate(blank_lines(3), 50.0, 10.0);
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.line_count() == 1));
    }

    #[test]
    fn no_lines_no_pages() {
        assert!(paginate(Vec::new(), 30.0, 100.0).is_empty());
    }
}
