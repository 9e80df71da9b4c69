use std::fmt::{self, Write};

// ======================== 日志预览 ========================
/// 空白折叠 + 截断的规则行预览（不分配新字符串）
/// 超出 `max_len` 个字符时以 `…` 结尾
#[inline(always)]
pub fn preview_compact<'a>(s: &'a str, max_len: usize) -> impl fmt::Display + 'a {
    struct LinePreview<'a> {
        line: &'a str,
        max_chars: usize,
    }

    impl<'a> fmt::Display for LinePreview<'a> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut written = 0;
            let mut in_whitespace = false;

            for ch in self.line.trim().chars() {
                if written >= self.max_chars {
                    f.write_char('…')?;
                    break;
                }

                if ch.is_whitespace() {
                    if !in_whitespace {
                        f.write_char(' ')?;
                        written += 1;
                        in_whitespace = true;
                    }
                } else {
                    f.write_char(ch)?;
                    written += 1;
                    in_whitespace = false;
                }
            }
            Ok(())
        }
    }

    LinePreview {
        line: s,
        max_chars: max_len,
    }
}
