use std::path::Path;

use anyhow::Context;

/// Sites fetched when no URLs are given
pub const DEFAULT_URLS: &[&str] = &[
    "http://www.gmw.cn",
    "https://www.djangoproject.com/",
    "https://github.com/aio-libs/aiohttp",
    "https://www.python.org/",
    "http://www.yahoo.com",
    "https://dzen.ru/",
    "http://www.wikipedia.org",
    "http://www.qq.com",
    "https://habr.com/ru/feed/",
    "http://www.twitter.com",
    "http://www.live.com",
    "http://www.taobao.com",
    "http://www.bing.com",
    "http://www.weibo.com",
    "http://www.sina.com.cn",
    "https://mail.ru/",
    "http://www.yahoo.co.jp",
    "http://www.msn.com",
    "http://www.vk.com",
    "http://www.google.de",
    "http://www.yandex.ru",
    "http://www.hao123.com",
    "http://www.google.co.uk",
    "http://www.reddit.com",
    "http://www.ebay.com",
    "http://www.google.fr",
    "https://fastapi.tiangolo.com/",
    "http://www.tmall.com",
    "http://www.google.com.br",
    "http://www.360.cn",
    "http://www.sohu.com",
    "http://www.amazon.co.jp",
    "http://www.pinterest.com",
    "https://docs.sqlalchemy.org/en/20/",
    "http://www.google.it",
    "http://www.google.ru",
    "http://www.microsoft.com",
    "http://www.google.es",
    "http://www.wordpress.com",
    "https://rt.rbc.ru/",
    "http://www.tumblr.com",
    "http://www.paypal.com",
    "http://www.blogspot.com",
    "https://stackoverflow.com/",
    "http://www.stackoverflow.com",
    "http://www.aliexpress.com",
    "http://www.naver.com",
    "http://www.ok.ru",
    "http://www.apple.com",
    "http://www.github.com",
    "http://www.chinadaily.com.cn",
    "http://www.imdb.com",
    "http://www.google.co.kr",
    "http://www.fc2.com",
    "http://www.jd.com",
    "http://www.blogger.com",
    "http://www.163.com",
    "http://www.google.ca",
    "https://regex101.com/",
    "http://www.amazon.in",
    "http://www.office.com",
    "http://www.google.co.id",
    "http://www.youku.com",
    "http://www.rakuten.co.jp",
    "http://www.craigslist.org",
    "http://www.amazon.de",
    "http://www.nicovideo.jp",
    "http://www.google.pl",
    "http://www.soso.com",
    "http://www.bilibili.com",
    "http://www.dropbox.com",
    "http://www.xinhuanet.com",
    "http://www.outbrain.com",
    "http://www.pixnet.net",
    "http://www.alibaba.com",
    "http://www.alipay.com",
    "http://www.booking.com",
    "https://www.jetbrains.com/",
    "http://www.google.com.au",
    "http://www.popads.net",
    "http://www.cntv.cn",
    "http://www.zhihu.com",
    "http://www.amazon.co.uk",
    "http://www.diply.com",
    "http://www.coccoc.com",
    "http://www.cnn.com",
    "http://www.bbc.co.uk",
    "http://www.twitch.tv",
    "http://www.wikia.com",
    "http://www.google.co.th",
    "http://www.go.com",
    "http://www.google.com.ph",
    "http://www.doubleclick.net",
    "http://www.onet.pl",
    "http://www.googleadservices.com",
    "https://www.sqlalchemy.org/",
    "http://www.googleweblight.com",
    "http://3dnews.ru",
];

/// Return true if the URL uses a scheme the fetchers can handle
pub fn is_http_url(url: &str) -> bool {
    url.split_once("://").is_some_and(|(scheme, rest)| {
        !rest.is_empty() && matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https")
    })
}

/// Pick the URLs for a run: explicit URLs first, then a URL file, then the built-in list
pub fn load(urls: &[String], urls_file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    if !urls.is_empty() {
        return Ok(urls.to_vec());
    }
    match urls_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read URL file '{path:?}'"))?;
            let urls = parse(&content);
            if let Some(bad) = urls.iter().find(|url| !is_http_url(url)) {
                return Err(anyhow::anyhow!("unsupported URL '{bad}' in '{path:?}'"));
            }
            Ok(urls)
        }
        None => Ok(DEFAULT_URLS.iter().map(|url| url.to_string()).collect()),
    }
}

/// One URL per line; blank lines and `#` comments are skipped
fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod is_http_url {
        use super::*;

        #[test]
        fn http_and_https() {
            assert!(is_http_url("http://www.gmw.cn"));
            assert!(is_http_url("HTTPS://habr.com/ru/feed/"));
        }

        #[test]
        fn other_schemes() {
            assert!(!is_http_url("file:///etc/hosts"));
            assert!(!is_http_url("ftp://example.com"));
            assert!(!is_http_url("www.example.com"));
            assert!(!is_http_url("http://"));
        }

        #[test]
        fn default_list() {
            assert!(DEFAULT_URLS.iter().all(|url| is_http_url(url)));
        }
    }

    mod load {
        use std::path::PathBuf;

        use super::*;

        fn url_file(content: &str) -> PathBuf {
            let path = std::env::temp_dir()
                .join(format!("pagesaver-urls-{}.txt", uuid::Uuid::new_v4()));
            std::fs::write(&path, content).unwrap();
            path
        }

        #[test]
        fn explicit_urls_win() {
            let urls = vec!["https://example.com/a".to_string()];
            assert_eq!(load(&urls, Some(Path::new("/nonexistent"))).unwrap(), urls);
        }

        #[test]
        fn builtin_list() {
            let urls = load(&[], None).unwrap();
            assert_eq!(urls.len(), DEFAULT_URLS.len());
            assert_eq!(urls[0], "http://www.gmw.cn");
        }

        #[test]
        fn from_file() {
            let path =
                url_file("# news\nhttps://habr.com/ru/feed/\n\n   http://www.bbc.co.uk  \n");

            let urls = load(&[], Some(&path)).unwrap();

            assert_eq!(urls, vec!["https://habr.com/ru/feed/", "http://www.bbc.co.uk"]);
            std::fs::remove_file(path).unwrap();
        }

        #[test]
        fn rejects_unsupported_scheme() {
            let path = url_file("https://habr.com/\nftp://example.com/file\n");

            let err = load(&[], Some(&path)).unwrap_err();

            assert!(err.to_string().contains("ftp://example.com/file"), "{err}");
            std::fs::remove_file(path).unwrap();
        }

        #[test]
        fn missing_file() {
            assert!(load(&[], Some(Path::new("/nonexistent/pagesaver/urls.txt"))).is_err());
        }
    }
}
